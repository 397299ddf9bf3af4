use crate::errors::ParseError;
use crate::filter::FilterRequest;

/// Parse an id list.
///
/// The list is a comma separated sequence of single ids (`0x100`) and
/// inclusive ranges (`0x200-0x2FF`). Numbers are read like C's `strtoul`
/// with base 0: a `0x` prefix means hex, a leading `0` octal, anything else
/// decimal. An empty string is an empty list.
///
/// ```
/// use canfilter::{parse_list, FilterRequest};
///
/// let list = parse_list("0x100,256,0x200-0x2FF").unwrap();
/// assert_eq!(list, vec![
///     FilterRequest::Id(0x100),
///     FilterRequest::Id(256),
///     FilterRequest::Range(0x200, 0x2ff),
/// ]);
/// ```
pub fn parse_list(input: &str) -> Result<Vec<FilterRequest>, ParseError> {
    let mut requests = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let id1 = number(input, &mut pos)?;

        let request = if input[pos..].starts_with('-') {
            pos += 1;
            FilterRequest::Range(id1, number(input, &mut pos)?)
        } else {
            FilterRequest::Id(id1)
        };
        requests.push(request);

        match input[pos..].chars().next() {
            None => {}
            Some(',') => pos += 1,
            Some(c) => return Err(ParseError::UnexpectedChar(c, pos)),
        }
    }

    Ok(requests)
}

/// Read one number starting at `*pos`, advancing past its digits.
fn number(input: &str, pos: &mut usize) -> Result<u32, ParseError> {
    let rest = &input[*pos..];

    let (radix, prefix) = if rest.starts_with("0x") || rest.starts_with("0X") {
        (16, 2)
    } else if rest.starts_with('0') {
        (8, 0)
    } else {
        (10, 0)
    };

    let digits = &rest[prefix..];
    let len = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or_else(|| digits.len());

    if len == 0 {
        return Err(ParseError::MissingNumber(*pos));
    }

    let value =
        u32::from_str_radix(&digits[..len], radix).map_err(|_| ParseError::Overflow(*pos))?;
    *pos += prefix + len;
    Ok(value)
}
