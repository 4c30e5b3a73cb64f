//! bracket helpers for the parser and grid helpers for sampling

/// Position of the rightmost *binary* operator from `operators` that is not
/// inside brackets. A sign is unary when it starts the input, follows another
/// operator or an opening bracket, or is the exponent sign of a number like `2e-3`.
pub fn find_rightmost_operator_outside_brackets(input: &str, operators: &[char]) -> Option<usize> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut depth = 0i32;
    let mut last = None;
    for (k, &(pos, c)) in chars.iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if depth == 0 && operators.contains(&c) => {
                if (c == '+' || c == '-') && is_unary_sign(&chars, k) {
                    continue;
                }
                last = Some(pos);
            }
            _ => {}
        }
    }
    last
}

/// Position of the leftmost `target` outside brackets (power is right-associative).
pub fn find_leftmost_char_outside_brackets(input: &str, target: char) -> Option<usize> {
    let mut depth = 0i32;
    for (pos, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if depth == 0 && c == target => return Some(pos),
            _ => {}
        }
    }
    None
}

fn is_unary_sign(chars: &[(usize, char)], k: usize) -> bool {
    if k == 0 {
        return true;
    }
    let prev = chars[k - 1].1;
    if matches!(prev, '+' | '-' | '*' | '/' | '^' | '(') {
        return true;
    }
    // mantissa exponent: 1.5e-3
    if (prev == 'e' || prev == 'E') && k >= 2 {
        let mut j = k - 2;
        let mut saw_digit = false;
        loop {
            let c = chars[j].1;
            if c.is_ascii_digit() || c == '.' {
                saw_digit = true;
            } else {
                return saw_digit && !(c.is_alphanumeric() || c == '_');
            }
            if j == 0 {
                return saw_digit;
            }
            j -= 1;
        }
    }
    false
}

/// Byte position of the bracket closing the one opened at `bracket_start`.
pub fn find_pair_to_this_bracket(input: &str, bracket_start: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (pos, c) in input[bracket_start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(bracket_start + pos);
                }
            }
            _ => {}
        }
    }
    None
}

/// true if every bracket is closed in the right order
pub fn brackets_are_balanced(input: &str) -> bool {
    let mut depth = 0i32;
    for c in input.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

pub fn linspace(start: f64, end: f64, num_values: usize) -> Vec<f64> {
    match num_values {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num_values - 1) as f64;
            (0..num_values).map(|i| start + step * i as f64).collect()
        }
    }
}
