#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

#[macro_export]
macro_rules! expr {
    (< $value:expr) => {
        $crate::Expr::new($crate::Operator::LessThan, $value)
    };
    (<= $value:expr) => {
        $crate::Expr::new($crate::Operator::LessEqual, $value)
    };
    (> $value:expr) => {
        $crate::Expr::new($crate::Operator::GreaterThan, $value)
    };
    (>= $value:expr) => {
        $crate::Expr::new($crate::Operator::GreaterEqual, $value)
    };
}

/// Build a [`Rule`](crate::Rule) in rule-file notation.
///
/// ```
/// use metricrule::rule;
///
/// let r = rule!(~ "local.signal.level", [>= 0.0, < 2.0]);
/// assert_eq!(r.to_string(), "~local.signal.level[>=0,<2]");
/// ```
#[macro_export]
macro_rules! rule {
    (~ $path:expr $(, [ $($op:tt $value:expr),* $(,)? ])?) => {
        $crate::Rule::new($path, false, vec![ $($($crate::expr!($op $value)),*)? ])
    };
    ($path:expr $(, [ $($op:tt $value:expr),* $(,)? ])?) => {
        $crate::Rule::new($path, true, vec![ $($($crate::expr!($op $value)),*)? ])
    };
}
