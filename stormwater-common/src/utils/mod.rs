// private sub-module defined in other files
mod byte_order_reader;
mod byte_order_writer;

// exports identifiers from private sub-modules in the current module namespace
pub use self::byte_order_reader::ByteOrderReader;
pub use self::byte_order_reader::Endianness;
pub use self::byte_order_writer::ByteOrderWriter;

use std::path;
use std::time::Instant;

/// Returns a formatted string of elapsed time, e.g.
/// `1min 34.852s`
pub fn get_formatted_elapsed_time(instant: Instant) -> String {
    let dur = instant.elapsed();
    let minutes = dur.as_secs() / 60;
    let sub_sec = dur.as_secs() % 60;
    let sub_milli = dur.subsec_millis();
    if minutes > 0 {
        return format!("{}min {}.{:03}s", minutes, sub_sec, sub_milli);
    }
    format!("{}.{:03}s", sub_sec, sub_milli)
}

/// Word-wraps `val` to `width` columns; paragraphs are separated by blank lines.
pub fn wrapped_text(val: &str, width: usize) -> String {
    let paragraphs: Vec<&str> = val.split("\n\n").collect();
    let mut ret = String::new();
    for (i, para) in paragraphs.iter().enumerate() {
        let s = para.replace('\n', " ");
        let mut line = String::new();
        for word in s.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
            } else if line.len() + word.len() + 1 <= width {
                line.push(' ');
                line.push_str(word);
            } else {
                ret.push_str(&line);
                ret.push('\n');
                line = word.to_string();
            }
        }
        ret.push_str(&line);
        if i < paragraphs.len() - 1 {
            ret.push_str("\n\n");
        }
    }
    ret
}

pub fn wrapped_print(val: &str, width: usize) {
    println!("{}", wrapped_text(val, width));
}

/// Prints the boxed banner shown at the start of every verbose tool run.
pub fn print_welcome(tool_name: &str) {
    let welcome_len = format!("* Welcome to {} *", tool_name).len().max(31);
    // 31 = length of the 'Powered by' statement.
    println!("{}", "*".repeat(welcome_len));
    println!(
        "* Welcome to {} {}*",
        tool_name,
        " ".repeat(welcome_len - 15 - tool_name.len())
    );
    println!("* Powered by Stormwater Tools {}*", " ".repeat(welcome_len - 31));
    println!("{}", "*".repeat(welcome_len));
}

/// Prefixes a bare file name with the working directory. Names that already
/// carry a directory component are returned unchanged.
pub fn resolve_file_name(file_name: &str, working_directory: &str) -> String {
    if file_name.contains(path::MAIN_SEPARATOR) || file_name.contains('/') {
        return file_name.to_string();
    }
    let sep = path::MAIN_SEPARATOR.to_string();
    if working_directory.is_empty() || working_directory.ends_with(&sep) {
        format!("{}{}", working_directory, file_name)
    } else {
        format!("{}{}{}", working_directory, sep, file_name)
    }
}

#[cfg(test)]
mod test {
    use super::{resolve_file_name, wrapped_text};
    use std::path;

    #[test]
    fn test_wrapped_text() {
        let s = wrapped_text("one two three four\n\nfive", 9);
        assert_eq!(s, "one two\nthree\nfour\n\nfive");
    }

    #[test]
    fn test_resolve_file_name() {
        let sep = path::MAIN_SEPARATOR;
        assert_eq!(
            resolve_file_name("pits.shp", &format!("data{}", sep)),
            format!("data{}pits.shp", sep)
        );
        assert_eq!(
            resolve_file_name("pits.shp", "data"),
            format!("data{}pits.shp", sep)
        );
        assert_eq!(resolve_file_name("a/pits.shp", "data"), "a/pits.shp");
        assert_eq!(resolve_file_name("pits.shp", ""), "pits.shp");
    }
}
