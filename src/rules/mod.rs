pub(crate) mod play;
