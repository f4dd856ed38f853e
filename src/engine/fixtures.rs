//! Event text shared by the machine and replay tests.
//!
//! Both lineups bat the pitcher ninth. Positions by slot: 4 9 8 5 3 2 6 7 1.

pub(crate) const OPENING_DAY: &str = "id,BOS201704030
version,2
info,visteam,PIT
info,hometeam,BOS
info,date,2017/04/03
info,site,BOS07
start,a1,\"Away One\",0,1,4
start,a2,\"Away Two\",0,2,9
start,a3,\"Away Three\",0,3,8
start,a4,\"Away Four\",0,4,5
start,a5,\"Away Five\",0,5,3
start,a6,\"Away Six\",0,6,2
start,a7,\"Away Seven\",0,7,6
start,a8,\"Away Eight\",0,8,7
start,a9,\"Away Pitcher\",0,9,1
start,h1,\"Home One\",1,1,4
start,h2,\"Home Two\",1,2,9
start,h3,\"Home Three\",1,3,8
start,h4,\"Home Four\",1,4,5
start,h5,\"Home Five\",1,5,3
start,h6,\"Home Six\",1,6,2
start,h7,\"Home Seven\",1,7,6
start,h8,\"Home Eight\",1,8,7
start,h9,\"Home Pitcher\",1,9,1
play,1,0,a1,12,CBFX,S7
play,1,0,a2,00,X,64(1)3/GDP
play,1,0,a3,32,BBCFBB,W
play,1,0,a4,01,CX,8/F
play,1,1,h1,00,X,HR/F7
play,1,1,h2,22,BCBS,K
play,1,1,h3,10,BX,D8/L
play,1,1,h4,00,X,S9/G.2-H
play,1,1,h5,00,X,43/G.1-2
play,1,1,h6,00,X,63/G
play,2,0,a5,00,X,S8
sub,h10,\"Home Reliever\",1,9,1
play,2,0,a6,00,X,HR/F8
com,\"reliever settles down\"
play,2,0,a7,02,CCS,K
";

/// The `OPENING_DAY` header and lineups under a new id, followed by `plays`.
pub(crate) fn game_with(id: &str, plays: &[&str]) -> String {
    let mut text = format!("id,{id}\n");
    for line in OPENING_DAY.lines().skip(1).take_while(|l| !l.starts_with("play,")) {
        text.push_str(line);
        text.push('\n');
    }
    for play in plays {
        text.push_str(play);
        text.push('\n');
    }
    text
}
