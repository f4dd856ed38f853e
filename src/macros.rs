#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

#[macro_export]
macro_rules! rule {
    (
        name: $name:expr,
        pattern: $pat:literal,
        category: $category:expr
        $(, shape: $shape:expr)?
        $(,)?
    ) => {{
        $crate::PlayRule {
            name: $name,
            pattern: $crate::regex!($pat),
            category: $category,
            shape: { 0 $(| $shape)? },
        }
    }};
}
