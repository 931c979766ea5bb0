//! Context assembly: linearizing node trees into prompt text.
//!
//! Every fragment taken from the document goes through [`Trigger::strip`] before it
//! is concatenated, so an in-progress invocation never leaks into the prompt.

use crate::error::CueError;
use crate::trigger::Trigger;
use cue_doc::{ContentNode, DocError, DocumentStore, NewNode, NodeId};
use regex::Regex;

/// Default number of characters kept from full-page context.
pub const DEFAULT_WINDOW_SIZE: usize = 4000;

/// One line recovered from a linearized outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineLine {
    pub depth: usize,
    pub text: String,
}

/// A reference embedded in block text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// `[[Title]]`
    Page { title: String },
    /// `((id))`
    Block { id: NodeId },
}

/// Snapshot of the document around the menu's target, taken at commit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyContext {
    pub target_node_id: NodeId,
    pub parent_id: Option<NodeId>,
    pub parent_text: String,
    /// Siblings in order, up to and including the target.
    pub siblings_before_target: Vec<ContentNode>,
    /// Number of children the parent has in total.
    pub sibling_count: usize,
    pub text_before_cursor: String,
}

/// Builds prompt context from the document.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    trigger: Trigger,
    references: Regex,
    window_size: usize,
}

impl ContextAssembler {
    pub fn new(trigger: Trigger, window_size: usize) -> Result<Self, CueError> {
        Ok(Self {
            trigger,
            references: Regex::new(r"\[\[(.*?)\]\]|\(\((.*?)\)\)")?,
            window_size,
        })
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Flatten `nodes` depth-first, one `"\t" * depth + "- " + text` line per node.
    ///
    /// Nodes whose text is empty after stripping contribute no line; their children
    /// still appear at their real depth.
    pub fn linearize(&self, nodes: &[ContentNode]) -> String {
        let mut out = String::new();
        self.write_nodes(nodes, 0, &mut out);
        out
    }

    fn write_nodes(&self, nodes: &[ContentNode], depth: usize, out: &mut String) {
        for node in nodes {
            let text = self.trigger.strip(&node.text);
            if !text.is_empty() {
                out.push_str(&"\t".repeat(depth));
                out.push_str("- ");
                out.push_str(text);
                out.push('\n');
            }
            self.write_nodes(&node.children, depth + 1, out);
        }
    }

    /// All references in `text`, in order of appearance.
    pub fn extract_references(&self, text: &str) -> Vec<Reference> {
        self.references
            .captures_iter(text)
            .filter_map(|caps| {
                if let Some(title) = caps.get(1) {
                    Some(Reference::Page {
                        title: title.as_str().to_string(),
                    })
                } else {
                    caps.get(2).map(|id| Reference::Block {
                        id: NodeId::from(id.as_str()),
                    })
                }
            })
            .collect()
    }

    /// Expand every reference in `text` to a headed linearization of its subtree.
    ///
    /// Text without references expands to an empty string.
    pub fn expand_references(&self, store: &dyn DocumentStore, text: &str) -> String {
        let mut out = String::new();
        for reference in self.extract_references(text) {
            let resolved = match &reference {
                Reference::Page { title } => store
                    .resolve_title(title)
                    .map(|id| (id, title.clone())),
                Reference::Block { id } => store
                    .node_text(id)
                    .map(|text| (id.clone(), self.trigger.strip(&text).to_string())),
            };

            let Some((root, title)) = resolved else {
                tracing::debug!(?reference, "skipping unresolved reference");
                continue;
            };
            let Some(tree) = store.subtree(&root) else {
                continue;
            };

            out.push_str(&format!("### {title}\n"));
            out.push_str(&self.linearize(&tree.children));
            out.push_str("\n\n");
        }
        out
    }

    /// Linearized page containing `node`, keeping only the last `window_size` characters.
    pub fn full_page(&self, store: &dyn DocumentStore, node: &NodeId) -> String {
        let Some(page) = store.page_of(node) else {
            return String::new();
        };
        let text = self.linearize(&store.children(&page));
        tail_chars(&text, self.window_size).to_string()
    }

    /// Snapshot the target's parent and preceding siblings.
    pub fn assemble(
        &self,
        store: &dyn DocumentStore,
        target: &NodeId,
        text_before_cursor: &str,
    ) -> AssemblyContext {
        let parent_id = store.parent_id(target);
        let siblings = parent_id
            .as_ref()
            .map(|p| store.children(p))
            .unwrap_or_default();
        let sibling_count = siblings.len();

        let mut siblings_before_target = Vec::new();
        for sibling in siblings {
            let is_target = &sibling.id == target;
            siblings_before_target.push(sibling);
            if is_target {
                break;
            }
        }

        AssemblyContext {
            target_node_id: target.clone(),
            parent_text: parent_id
                .as_ref()
                .and_then(|p| store.node_text(p))
                .unwrap_or_default(),
            parent_id,
            siblings_before_target,
            sibling_count,
            text_before_cursor: text_before_cursor.to_string(),
        }
    }
}

/// Recover `(depth, text)` pairs from a linearized outline.
pub fn parse_outline(text: &str) -> Vec<OutlineLine> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let body = line.trim_start_matches('\t');
            let depth = line.len() - body.len();
            let body = match body {
                "-" => "",
                _ => body.strip_prefix("- ").unwrap_or(body),
            };
            OutlineLine {
                depth,
                text: body.to_string(),
            }
        })
        .collect()
}

/// Serialize `nodes` as an outline file: every block on its own line, text verbatim.
///
/// Inverse of [`parse_outline`]. Empty blocks are kept so their children stay nested.
pub fn write_outline(nodes: &[ContentNode]) -> String {
    fn write(nodes: &[ContentNode], depth: usize, out: &mut String) {
        for node in nodes {
            out.push_str(&"\t".repeat(depth));
            out.push_str("- ");
            out.push_str(&node.text);
            out.push('\n');
            write(&node.children, depth + 1, out);
        }
    }

    let mut out = String::new();
    write(nodes, 0, &mut out);
    out
}

/// Create `lines` under `page`, nesting each line under the closest shallower one.
///
/// Returns the created ids in line order.
pub fn seed_outline(
    store: &mut dyn DocumentStore,
    page: &NodeId,
    lines: &[OutlineLine],
) -> Result<Vec<NodeId>, DocError> {
    let mut stack: Vec<NodeId> = Vec::new();
    let mut ids = Vec::with_capacity(lines.len());
    for line in lines {
        stack.truncate(line.depth);
        let parent = stack.last().cloned().unwrap_or_else(|| page.clone());
        let id = store.create_node(NewNode::append(parent, line.text.as_str()))?;
        stack.push(id.clone());
        ids.push(id);
    }
    Ok(ids)
}

/// The last `n` characters of `text`.
fn tail_chars(text: &str, n: usize) -> &str {
    let count = text.chars().count();
    if count <= n {
        return text;
    }
    match text.char_indices().nth(count - n) {
        Some((idx, _)) => &text[idx..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::DEFAULT_TRIGGER;
    use cue_doc::MemoryDocument;

    fn assembler(window: usize) -> ContextAssembler {
        ContextAssembler::new(Trigger::new(DEFAULT_TRIGGER).unwrap(), window).unwrap()
    }

    fn tree() -> Vec<ContentNode> {
        vec![
            ContentNode::leaf("a", "Alpha")
                .with_child(ContentNode::leaf("a1", "One").with_child(ContentNode::leaf("a11", "Deep")))
                .with_child(ContentNode::leaf("a2", "Two")),
            ContentNode::leaf("b", "Beta"),
        ]
    }

    #[test]
    fn test_linearize_nested() {
        let text = assembler(DEFAULT_WINDOW_SIZE).linearize(&tree());
        assert_eq!(text, "- Alpha\n\t- One\n\t\t- Deep\n\t- Two\n- Beta\n");
    }

    #[test]
    fn test_linearize_flat_is_joined_lines() {
        let nodes = vec![ContentNode::leaf("x", "x"), ContentNode::leaf("y", "y")];
        assert_eq!(assembler(10).linearize(&nodes), "- x\n- y\n");
    }

    #[test]
    fn test_linearize_skips_empty_keeps_descendants() {
        let nodes = vec![ContentNode::leaf("e", "").with_child(ContentNode::leaf("c", "Child"))];
        assert_eq!(assembler(10).linearize(&nodes), "\t- Child\n");
    }

    #[test]
    fn test_linearize_strips_trigger() {
        let nodes = vec![ContentNode::leaf("t", "Ask this qq"), ContentNode::leaf("u", "qq")];
        assert_eq!(assembler(100).linearize(&nodes), "- Ask this \n");
    }

    #[test]
    fn test_outline_round_trip_depths() {
        let text = assembler(DEFAULT_WINDOW_SIZE).linearize(&tree());
        let lines = parse_outline(&text);
        let pairs: Vec<_> = lines.iter().map(|l| (l.depth, l.text.as_str())).collect();
        assert_eq!(
            pairs,
            vec![(0, "Alpha"), (1, "One"), (2, "Deep"), (1, "Two"), (0, "Beta")]
        );
    }

    #[test]
    fn test_extract_references() {
        let refs = assembler(10).extract_references("see [[Paris]] and ((abc123)) then [[Rome]]");
        assert_eq!(
            refs,
            vec![
                Reference::Page { title: "Paris".to_string() },
                Reference::Block { id: NodeId::from("abc123") },
                Reference::Page { title: "Rome".to_string() },
            ]
        );
    }

    #[test]
    fn test_no_references_expand_to_empty() {
        let doc = MemoryDocument::new();
        let a = assembler(10);
        assert!(a.extract_references("nothing referenced").is_empty());
        assert_eq!(a.expand_references(&doc, "nothing referenced"), "");
    }

    #[test]
    fn test_expand_page_and_block_references() {
        let mut doc = MemoryDocument::new();
        let paris = doc.add_page("Paris");
        doc.push_child(&paris, "Capital of France").unwrap();
        let notes = doc.add_page("Notes");
        let block = doc.push_child(&notes, "Rivers").unwrap();
        doc.push_child(&block, "Seine").unwrap();

        let a = assembler(DEFAULT_WINDOW_SIZE);
        let text = format!("[[Paris]] (({block})) [[Missing]]");
        let expanded = a.expand_references(&doc, &text);
        assert_eq!(
            expanded,
            "### Paris\n- Capital of France\n\n\n### Rivers\n- Seine\n\n\n"
        );
    }

    #[test]
    fn test_full_page_keeps_tail() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page("Long");
        let ids: Vec<_> = (0..50)
            .map(|i| doc.push_child(&page, format!("line number {i}")).unwrap())
            .collect();
        let last = ids[49].clone();

        let a = assembler(40);
        let full = assembler(100_000).full_page(&doc, &last);
        let tail = a.full_page(&doc, &last);
        assert_eq!(tail.chars().count(), 40);
        assert!(full.ends_with(&tail));
        assert!(!full.starts_with(&tail));
        assert!(tail.ends_with("- line number 49\n"));
    }

    #[test]
    fn test_seed_outline_nests_by_depth() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page("Seeded");
        let lines = parse_outline("- a\n\t- b\n\t\t- c\n\t- d\n- e\n");
        let ids = seed_outline(&mut doc, &page, &lines).unwrap();
        assert_eq!(ids.len(), 5);
        assert_eq!(doc.parent_id(&ids[1]), Some(ids[0].clone()));
        assert_eq!(doc.parent_id(&ids[2]), Some(ids[1].clone()));
        assert_eq!(doc.parent_id(&ids[3]), Some(ids[0].clone()));
        assert_eq!(doc.parent_id(&ids[4]), Some(page.clone()));

        let text = assembler(DEFAULT_WINDOW_SIZE).linearize(&doc.children(&page));
        assert_eq!(text, "- a\n\t- b\n\t\t- c\n\t- d\n- e\n");
    }

    #[test]
    fn test_seed_outline_depth_jump_attaches_to_deepest() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page("Jump");
        let lines = parse_outline("- a\n\t\t\t- deep\n");
        let ids = seed_outline(&mut doc, &page, &lines).unwrap();
        assert_eq!(doc.parent_id(&ids[1]), Some(ids[0].clone()));
    }

    #[test]
    fn test_write_outline_round_trip_keeps_empty_and_trigger() {
        let source = "- a\n- \n\t- child\n- I really like qq\n";
        let mut doc = MemoryDocument::new();
        let page = doc.add_page("Saved");
        let ids = seed_outline(&mut doc, &page, &parse_outline(source)).unwrap();
        assert_eq!(doc.parent_id(&ids[2]), Some(ids[1].clone()));

        let saved = write_outline(&doc.children(&page));
        assert_eq!(saved, source);

        let mut reloaded = MemoryDocument::new();
        let page = reloaded.add_page("Saved");
        let ids = seed_outline(&mut reloaded, &page, &parse_outline(&saved)).unwrap();
        assert_eq!(reloaded.node_text(&ids[1]).as_deref(), Some(""));
        assert_eq!(reloaded.parent_id(&ids[2]), Some(ids[1].clone()));
        assert_eq!(reloaded.node_text(&ids[3]).as_deref(), Some("I really like qq"));
    }

    #[test]
    fn test_parse_outline_bare_dash_is_empty_block() {
        let lines = parse_outline("- a\n-\n\t- child\n");
        assert_eq!(lines[1], OutlineLine { depth: 0, text: String::new() });
        assert_eq!(lines[2].depth, 1);
    }

    #[test]
    fn test_tail_chars_multibyte() {
        assert_eq!(tail_chars("héllo", 3), "llo");
        assert_eq!(tail_chars("hé", 5), "hé");
        assert_eq!(tail_chars("abc", 0), "");
    }

    #[test]
    fn test_assemble_siblings_up_to_target() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page("Page");
        let parent = doc.push_child(&page, "Geography facts").unwrap();
        let first = doc.push_child(&parent, "Water").unwrap();
        let target = doc.push_child(&parent, "Paris qq").unwrap();
        doc.push_child(&parent, "After").unwrap();

        let ctx = assembler(10).assemble(&doc, &target, "Paris qq");
        assert_eq!(ctx.parent_id, Some(parent));
        assert_eq!(ctx.parent_text, "Geography facts");
        assert_eq!(ctx.sibling_count, 3);
        let ids: Vec<_> = ctx.siblings_before_target.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec![first, target]);
    }
}
