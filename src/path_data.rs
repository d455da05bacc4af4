//! Minimal SVG path data reader for decorative line art.
//!
//! Only straight-line commands are understood (`M`, `L`, `H`, `V`, `Z`, both
//! absolute and relative); decorative lettering for the plotter is single-line
//! glyph outlines, so curves never show up.

use glam::{DVec2, dvec2};

use crate::types::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Command(char),
    Number(f64),
}

fn tokenize(d: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let bytes = d.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() || c == ',' {
            i += 1;
        } else if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            tokens.push(Token::Command(c));
            i += 1;
        } else if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() {
            let start = i;
            i += 1;
            let mut seen_dot = c == '.';
            while i < bytes.len() {
                let n = bytes[i] as char;
                if n.is_ascii_digit() {
                    i += 1;
                } else if n == '.' && !seen_dot {
                    seen_dot = true;
                    i += 1;
                } else if (n == 'e' || n == 'E') && i + 1 < bytes.len() {
                    i += 1;
                    if bytes[i] == b'-' || bytes[i] == b'+' {
                        i += 1;
                    }
                } else {
                    break;
                }
            }
            let text = &d[start..i];
            let value = text
                .parse::<f64>()
                .map_err(|_| format!("invalid number `{}` at offset {}", text, start))?;
            tokens.push(Token::Number(value));
        } else {
            return Err(format!("unexpected character `{}` at offset {}", c, i));
        }
    }

    Ok(tokens)
}

/// Parse path data into polylines, one per subpath, in path coordinates.
pub fn parse_polylines(d: &str) -> Result<Vec<Vec<Point>>, String> {
    let tokens = tokenize(d)?;
    let mut polylines: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut pen = DVec2::ZERO;
    let mut subpath_start = DVec2::ZERO;
    let mut command: Option<char> = None;
    let mut has_moveto = false;
    let mut i = 0;

    let number = |i: &mut usize| -> Result<f64, String> {
        match tokens.get(*i) {
            Some(Token::Number(v)) => {
                *i += 1;
                Ok(*v)
            }
            _ => Err(format!("expected a number after token {}", *i)),
        }
    };

    while i < tokens.len() {
        let cmd = match tokens[i] {
            Token::Command(c) => {
                i += 1;
                c
            }
            // Repeated coordinates reuse the previous command; a repeated
            // moveto continues as a lineto
            Token::Number(_) => match command {
                Some('M') => 'L',
                Some('m') => 'l',
                Some(c) if c != 'Z' && c != 'z' => c,
                _ => return Err("path data must start with a moveto".to_string()),
            },
        };
        let relative = cmd.is_ascii_lowercase();
        let origin = if relative { pen } else { DVec2::ZERO };
        let upper = cmd.to_ascii_uppercase();

        if upper != 'M' && !has_moveto {
            return Err(format!("command `{}` before any moveto", cmd));
        }
        // Drawing after a closepath starts from the subpath start
        if matches!(upper, 'L' | 'H' | 'V') && current.is_empty() {
            current.push(pen);
        }

        match upper {
            'M' => {
                has_moveto = true;
                if current.len() > 1 {
                    polylines.push(std::mem::take(&mut current));
                }
                current.clear();
                pen = origin + dvec2(number(&mut i)?, number(&mut i)?);
                subpath_start = pen;
                current.push(pen);
            }
            'L' => {
                pen = origin + dvec2(number(&mut i)?, number(&mut i)?);
                current.push(pen);
            }
            'H' => {
                let x = number(&mut i)?;
                pen = dvec2(if relative { pen.x + x } else { x }, pen.y);
                current.push(pen);
            }
            'V' => {
                let y = number(&mut i)?;
                pen = dvec2(pen.x, if relative { pen.y + y } else { y });
                current.push(pen);
            }
            'Z' => {
                if !current.is_empty() {
                    current.push(subpath_start);
                }
                pen = subpath_start;
                if current.len() > 1 {
                    polylines.push(std::mem::take(&mut current));
                }
                current.clear();
            }
            other => return Err(format!("unsupported path command `{}`", other)),
        }
        command = Some(cmd);
    }

    if current.len() > 1 {
        polylines.push(current);
    }
    Ok(polylines)
}
