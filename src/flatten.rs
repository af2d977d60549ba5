use crate::render::numbered_movetext;
use crate::tree::{GameTree, Node};

pub const MAIN_LINE_ID: &str = "main";
pub const MAIN_LINE_NAME: &str = "Main line";

/// One root-to-leaf path through the tree, as a flat move list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variation {
    /// `"main"`, or one `{ply}-{index}` segment per branch taken, joined by `/`.
    pub id: String,
    pub name: String,
    /// Every move from the initial position to the leaf.
    pub moves: Vec<String>,
    /// Number of leading moves shared with the line this one branches from.
    pub departs_at: usize,
    pub is_main_line: bool,
}

/// Lists the main line first, then every branch depth-first: each branch is
/// followed by its own sub-variations before its next sibling.
pub fn flatten<P>(tree: &GameTree<P>, name_length: usize) -> Vec<Variation> {
    let mut flattener = Flattener {
        name_length,
        out: Vec::new(),
    };

    let main: Vec<String> = tree.root.main_line().map(|n| n.san.clone()).collect();
    flattener.out.push(Variation {
        id: MAIN_LINE_ID.to_string(),
        name: MAIN_LINE_NAME.to_string(),
        moves: main,
        departs_at: 0,
        is_main_line: true,
    });

    flattener.walk(&tree.root, "", Vec::new());
    flattener.out
}

struct Flattener {
    name_length: usize,
    out: Vec<Variation>,
}

impl Flattener {
    /// Follows the main line below `start`, emitting every alternative found
    /// on the way. `prefix` holds the moves leading to `start`.
    ///
    /// Recursion depth equals variation nesting, which the builder caps.
    fn walk<P>(&mut self, start: &Node<P>, id: &str, mut prefix: Vec<String>) {
        let mut node = start;

        loop {
            for (index, alternative) in node.children.iter().enumerate().skip(1) {
                let own: Vec<String> = std::iter::once(alternative)
                    .chain(alternative.main_line())
                    .map(|n| n.san.clone())
                    .collect();

                let segment = format!("{}-{}", prefix.len() + 1, index);
                let branch_id = if id.is_empty() {
                    segment
                } else {
                    format!("{id}/{segment}")
                };

                let shown = own.len().min(self.name_length.max(1));
                let mut moves = prefix.clone();
                moves.extend(own.iter().cloned());

                self.out.push(Variation {
                    id: branch_id.clone(),
                    name: numbered_movetext(&own[..shown], prefix.len()),
                    moves,
                    departs_at: prefix.len(),
                    is_main_line: false,
                });

                let mut branch_prefix = prefix.clone();
                branch_prefix.push(alternative.san.clone());
                self.walk(alternative, &branch_id, branch_prefix);
            }

            match node.main_child() {
                Some(next) => {
                    prefix.push(next.san.clone());
                    node = next;
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_NAME_LENGTH;
    use crate::sanitize::sanitize;
    use crate::tokenize::tokenize;
    use crate::tree::build_tree;
    use crate::validator::{StrictSan, replay};

    fn variations(text: &str) -> Vec<Variation> {
        let tree = build_tree(&tokenize(&sanitize(text)), &StrictSan, 64).unwrap();
        flatten(&tree, DEFAULT_NAME_LENGTH)
    }

    fn ids(vars: &[Variation]) -> Vec<&str> {
        vars.iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn test_main_line_only() {
        let vars = variations("1. e4 e5 2. Nf3");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].id, "main");
        assert_eq!(vars[0].name, "Main line");
        assert_eq!(vars[0].moves, ["e4", "e5", "Nf3"]);
        assert!(vars[0].is_main_line);
    }

    #[test]
    fn test_variation_count_agrees_with_flatten() {
        for text in [
            "1. e4 e5 2. Nf3",
            "1.e4 (1.d4 d5 2.c4) 1...c5 (1...e5 2.Nf3 Nc6)",
            "1. e4 e5 (1... c5 2. Nf3 (2. c3 d5) (2. Nc3) d6) (1... e6) 2. Nf3",
        ] {
            let tree = build_tree(&tokenize(&sanitize(text)), &StrictSan, 64).unwrap();
            assert_eq!(tree.variation_count(), flatten(&tree, DEFAULT_NAME_LENGTH).len());
        }
    }

    #[test]
    fn test_branches_carry_accumulated_prefix() {
        let vars = variations("1.e4 (1.d4 d5 2.c4) 1...c5 (1...e5 2.Nf3 Nc6)");
        assert_eq!(ids(&vars), ["main", "1-1", "2-1"]);

        assert_eq!(vars[0].moves, ["e4", "c5"]);

        assert_eq!(vars[1].moves, ["d4", "d5", "c4"]);
        assert_eq!(vars[1].name, "1. d4 d5 2. c4");
        assert_eq!(vars[1].departs_at, 0);
        assert!(!vars[1].is_main_line);

        assert_eq!(vars[2].moves, ["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(vars[2].name, "1... e5 2. Nf3 Nc6");
        assert_eq!(vars[2].departs_at, 1);
    }

    #[test]
    fn test_sub_variations_come_before_next_sibling() {
        let vars = variations(
            "1. e4 e5 (1... c5 2. Nf3 (2. c3 d5) 2... d6) (1... e6 2. d4) 2. Nf3",
        );
        assert_eq!(ids(&vars), ["main", "2-1", "2-1/3-1", "2-2"]);
        assert_eq!(vars[1].moves, ["e4", "c5", "Nf3", "d6"]);
        assert_eq!(vars[2].moves, ["e4", "c5", "c3", "d5"]);
        assert_eq!(vars[2].departs_at, 2);
        assert_eq!(vars[3].moves, ["e4", "e6", "d4"]);
    }

    #[test]
    fn test_branch_points_follow_main_line_order() {
        let vars = variations("1. e4 (1. d4) e5 2. Nf3 (2. Bc4) Nc6 (2... d6)");
        assert_eq!(ids(&vars), ["main", "1-1", "3-1", "4-1"]);
        assert_eq!(vars[2].moves, ["e4", "e5", "Bc4"]);
        assert_eq!(vars[3].moves, ["e4", "e5", "Nf3", "d6"]);
    }

    #[test]
    fn test_names_use_only_first_branch_moves() {
        let vars = variations("1. e4 e5 (1... c5 2. Nf3 d6 3. d4 cxd4 4. Nxd4) 2. Nf3");
        assert_eq!(vars[1].name, "1... c5 2. Nf3 d6 3. d4");

        let tree = build_tree(
            &tokenize(&sanitize("1. e4 e5 (1... c5 2. Nf3) 2. Nf3")),
            &StrictSan,
            64,
        )
        .unwrap();
        assert_eq!(flatten(&tree, 1)[1].name, "1... c5");
    }

    #[test]
    fn test_every_variation_replays_legally() {
        let text = "1. e4 e5 (1... c5 2. Nf3 (2. c3 d5 3. exd5 Qxd5) d6) \
                    (1... e6 2. d4 d5) 2. Nf3 Nc6 (2... d6 3. d4) 3. Bb5 (3. Bc4 Bc5) a6";
        let vars = variations(text);
        assert_eq!(vars.len(), 6);
        for variation in &vars {
            assert!(
                replay(&StrictSan, &variation.moves).is_ok(),
                "variation {} does not replay",
                variation.id
            );
        }
    }

    #[test]
    fn test_flatten_is_repeatable() {
        let text = "1. e4 (1. d4 d5) e5 2. Nf3 (2. Bc4) Nc6";
        let tree = build_tree(&tokenize(&sanitize(text)), &StrictSan, 64).unwrap();
        assert_eq!(flatten(&tree, 4), flatten(&tree, 4));
    }
}
