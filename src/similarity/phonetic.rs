//! Phonetic signatures for matching similarly sounding names

/// Code returned for an empty input string
pub const EMPTY_PHONETIC_CODE: &str = "ZERO";

/// Length of every non-empty phonetic code
const CODE_LENGTH: usize = 4;

/// Maps an uppercase character to its phonetic digit
fn digit_for(c: char) -> char {
    match c {
        'B' | 'F' | 'P' | 'V' => '1',
        'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => '2',
        'D' | 'T' => '3',
        'L' => '4',
        'M' | 'N' => '5',
        'R' => '6',
        _ => '0',
    }
}

/// Computes the four character phonetic code of a string
///
/// The first character is kept (uppercased) when it is alphabetic and replaced
/// by `'0'` otherwise. Each following character contributes its digit unless
/// the digit is `'0'` or equal to the digit of the character right before it.
/// The result is padded with `'0'` or truncated to four characters.
///
/// An empty string yields [`EMPTY_PHONETIC_CODE`].
///
/// # Example
///
/// ```
/// use crawl_keeper::similarity::phonetic_code;
///
/// assert_eq!(phonetic_code("Robert"), "R163");
/// assert_eq!(phonetic_code("Robert"), phonetic_code("Rupert"));
/// ```
pub fn phonetic_code(s: &str) -> String {
    let upper: Vec<char> = s.to_uppercase().chars().collect();
    let Some(&first) = upper.first() else {
        return EMPTY_PHONETIC_CODE.to_string();
    };

    let digits: Vec<char> = upper.iter().map(|&c| digit_for(c)).collect();

    let mut code = String::with_capacity(CODE_LENGTH);
    code.push(if first.is_alphabetic() { first } else { '0' });

    for pair in digits.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        if current != previous && current != '0' {
            code.push(current);
        }
    }

    let length = code.chars().count();
    if length < CODE_LENGTH {
        code.extend(std::iter::repeat('0').take(CODE_LENGTH - length));
        code
    } else {
        code.chars().take(CODE_LENGTH).collect()
    }
}
