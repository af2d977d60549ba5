use std::fmt::Write;

/// Renders moves with move numbers, `first_ply` being the 0-based ply of the
/// first move (`0` is White's first move).
///
/// `["e5", "Nf3"]` from ply 1 renders as `1... e5 2. Nf3`.
pub fn numbered_movetext<S: AsRef<str>>(moves: &[S], first_ply: usize) -> String {
    let mut out = String::new();

    for (i, san) in moves.iter().enumerate() {
        let ply = first_ply + i;
        let move_no = ply / 2 + 1;

        if !out.is_empty() {
            out.push(' ');
        }
        if ply.is_multiple_of(2) {
            let _ = write!(out, "{}. ", move_no);
        } else if i == 0 {
            let _ = write!(out, "{}... ", move_no);
        }
        out.push_str(san.as_ref());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_from_start() {
        assert_eq!(
            numbered_movetext(&["e4", "c5", "Nf3"], 0),
            "1. e4 c5 2. Nf3"
        );
    }

    #[test]
    fn test_numbered_from_black_move() {
        assert_eq!(
            numbered_movetext(&["e5", "Nf3", "Nc6"], 1),
            "1... e5 2. Nf3 Nc6"
        );
    }

    #[test]
    fn test_numbered_later_in_game() {
        assert_eq!(numbered_movetext(&["c3", "d5"], 2), "2. c3 d5");
        assert_eq!(numbered_movetext(&["Nf6"], 9), "5... Nf6");
    }

    #[test]
    fn test_numbered_empty() {
        let none: [&str; 0] = [];
        assert_eq!(numbered_movetext(&none, 0), "");
    }
}
