use chrono::Local;
use std::fmt;

fn line(level: &str, args: fmt::Arguments) -> String {
    format!("[{}] {} supercol {}", Local::now().format("%Y-%m-%d %H:%M:%S"), level, args)
}

pub fn info(args: fmt::Arguments) {
    println!("{}", line("INFO", args));
}

pub fn warn(args: fmt::Arguments) {
    println!("{}", line("WARN", args));
}

pub fn error(args: fmt::Arguments) {
    eprintln!("{}", line("ERROR", args));
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::logger::info(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::logger::warn(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::logger::error(format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_carries_level_and_message() {
        let rendered = line("WARN", format_args!("secondary write for {} failed", "u1"));
        assert!(rendered.contains("WARN supercol secondary write for u1 failed"));
        assert!(rendered.starts_with('['));
    }
}
