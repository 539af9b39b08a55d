use metricrule::{MatchDetails, Violation, ViolationKinds};
use std::time::Duration;

pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

/// One diagnostic line for `violation`, prefixed by the input it came from.
pub fn print_violation(source: &str, violation: &Violation, palette: &ansi::Palette) {
    let color = match violation {
        Violation::OutOfRange { .. } => ansi::RED,
        Violation::Missing { .. } => ansi::YELLOW,
        Violation::Unexpected { .. } => ansi::CYAN,
    };
    println!("{}: {}", palette.bold(source), palette.paint(violation.to_string(), color));
}

/// An input that could not be checked at all.
pub fn print_input_error(source: &str, err: &dyn std::error::Error, palette: &ansi::Palette) {
    eprintln!("{}: {}", palette.bold(source), palette.paint(err.to_string(), ansi::RED));
}

pub fn print_summary(source: &str, violations: &[Violation], elapsed: Duration, details: &MatchDetails, palette: &ansi::Palette) {
    println!("\n{}", palette.paint(format!("━━━ {source} ━━━"), ansi::GRAY));

    let count = |kind: ViolationKinds| violations.iter().filter(|v| v.kind() == kind).count();
    println!(
        "  {} {}  │  {} {}  │  {} {}",
        palette.dim("out of range:"),
        fmt_count(count(ViolationKinds::OUT_OF_RANGE), palette),
        palette.dim("missing:"),
        fmt_count(count(ViolationKinds::MISSING), palette),
        palette.dim("unexpected:"),
        fmt_count(count(ViolationKinds::UNEXPECTED), palette),
    );

    let unmatched = details.coverage.iter().filter(|c| c.matched == 0).count();
    println!(
        "  {} {}/{}  │  {} {}",
        palette.dim("rules matched:"),
        palette.paint((details.coverage.len() - unmatched).to_string(), ansi::GREEN),
        details.coverage.len(),
        palette.dim("trie nodes:"),
        details.nodes,
    );

    println!(
        "  Total: {}  │  Build: {}  │  Evaluate: {}  │  Complete: {}",
        palette.paint(format!("{elapsed:?}"), ansi::GREEN),
        palette.dim(format!("{:?}", details.build)),
        palette.paint(format!("{:?}", details.evaluate), ansi::CYAN),
        palette.dim(format!("{:?}", details.complete)),
    );
}

fn fmt_count(n: usize, palette: &ansi::Palette) -> String {
    if n == 0 { palette.dim("0") } else { palette.paint(n.to_string(), ansi::RED) }
}
