// Frame store: enumerates extracted frame images in natural order.

use anyhow::{bail, Result};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// List the frame images directly inside `dir`, sorted by natural filename
/// order so that `frame_2` precedes `frame_10`.
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Frame directory not found: {}", dir.display());
    }

    let mut frames: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|s| FRAME_EXTENSIONS.contains(&s.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    frames.sort_by(|a, b| natural_cmp(&file_name_lossy(a), &file_name_lossy(b)));
    Ok(frames)
}

/// List the `.txt` label files directly inside `dir`, naturally ordered.
pub fn list_label_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Label directory not found: {}", dir.display());
    }

    let mut labels: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|s| s.eq_ignore_ascii_case("txt"))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    labels.sort_by(|a, b| natural_cmp(&file_name_lossy(a), &file_name_lossy(b)));
    Ok(labels)
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compare two filenames treating runs of digits as numbers.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ta = tokens(a).into_iter();
    let mut tb = tokens(b).into_iter();
    loop {
        match (ta.next(), tb.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (&x, &y) {
                    (Token::Num(n), Token::Num(m)) => n.cmp(m),
                    (Token::Num(_), Token::Text(_)) => Ordering::Less,
                    (Token::Text(_), Token::Num(_)) => Ordering::Greater,
                    (Token::Text(s), Token::Text(t)) => s.cmp(t),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Num(u128),
    Text(String),
}

fn tokens(s: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut buf_is_digit = false;

    for c in s.chars() {
        let is_digit = c.is_ascii_digit();
        if !buf.is_empty() && is_digit != buf_is_digit {
            out.push(flush(&mut buf, buf_is_digit));
        }
        buf.push(c);
        buf_is_digit = is_digit;
    }
    if !buf.is_empty() {
        out.push(flush(&mut buf, buf_is_digit));
    }
    out
}

fn flush(buf: &mut String, is_digit: bool) -> Token {
    let token = if is_digit {
        // Digit runs longer than u128 are not a realistic frame index
        buf.parse::<u128>()
            .map(Token::Num)
            .unwrap_or_else(|_| Token::Text(buf.clone()))
    } else {
        Token::Text(buf.clone())
    };
    buf.clear();
    token
}
