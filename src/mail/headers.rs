use crate::domain::MessageHeader;

/// Value of the header called `name` (case-sensitive). When the name repeats
/// the last occurrence wins.
pub fn find_header<'a>(headers: &'a [MessageHeader], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .rev()
        .find(|h| h.name == name)
        .map(|h| h.value.as_str())
}

pub fn subject(headers: &[MessageHeader]) -> Option<&str> {
    find_header(headers, "Subject")
}

pub fn from(headers: &[MessageHeader]) -> Option<&str> {
    find_header(headers, "From")
}
