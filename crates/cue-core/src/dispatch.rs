//! Writing backend replies back into the document.

use crate::options::{MenuOption, OptionKind, WriteBack};
use crate::prompt::ASSISTANT_MARKER;
use cue_doc::{DocError, DocumentStore, NewNode, NodeId};
use cue_provider::BackendReply;

/// One document write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(NewNode),
    Update { id: NodeId, text: String },
}

/// Where a reply lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTarget {
    /// Node the menu was opened on.
    pub target: NodeId,
    pub parent: Option<NodeId>,
    /// Page containing the target.
    pub page: Option<NodeId>,
}

/// Compute the writes for a reply to `option`.
///
/// `reply` is `None` for options that make no backend call. Error replies produce
/// no writes.
pub fn plan(option: &MenuOption, reply: Option<&BackendReply>, at: &DispatchTarget) -> Vec<Mutation> {
    if let Some(BackendReply::Error(_)) = reply {
        return Vec::new();
    }

    match (&option.kind, reply) {
        (OptionKind::NewChatPage, _) => vec![Mutation::Create(NewNode::append(
            at.target.clone(),
            format!("[[ChatRoom {}]]", ulid::Ulid::new()),
        ))],
        (OptionKind::Chat, Some(BackendReply::Chat(text))) => match &at.page {
            Some(page) if !text.is_empty() => vec![Mutation::Create(NewNode::append(
                page.clone(),
                format!("{ASSISTANT_MARKER} {text}"),
            ))],
            _ => Vec::new(),
        },
        (OptionKind::Image { .. }, Some(BackendReply::Image(Some(url)))) => {
            vec![Mutation::Create(NewNode::append(
                at.target.clone(),
                format!("![]({url})"),
            ))]
        }
        (OptionKind::Text { write_back, .. }, Some(BackendReply::Text(text))) => {
            let lines = completion_lines(text);
            match write_back {
                WriteBack::InsertChildren => lines
                    .into_iter()
                    .rev()
                    .map(|line| Mutation::Create(NewNode::at(at.target.clone(), 0, line)))
                    .collect(),
                WriteBack::ReplaceParent => match (&at.parent, lines.into_iter().next()) {
                    (Some(parent), Some(first)) => vec![Mutation::Update {
                        id: parent.clone(),
                        text: first,
                    }],
                    _ => Vec::new(),
                },
            }
        }
        (kind, reply) => {
            tracing::debug!(?kind, ?reply, "reply does not match option kind");
            Vec::new()
        }
    }
}

/// Commit `mutations` one by one, stopping at the first failure.
///
/// Writes made before a failure stay in place.
pub fn apply(store: &mut dyn DocumentStore, mutations: Vec<Mutation>) -> Result<usize, DocError> {
    let mut applied = 0;
    for mutation in mutations {
        match mutation {
            Mutation::Create(node) => {
                store.create_node(node)?;
            }
            Mutation::Update { id, text } => store.update_node(&id, &text)?,
        }
        applied += 1;
    }
    Ok(applied)
}

/// Meaningful lines of a completion: trimmed, bullet-stripped, blanks dropped.
fn completion_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix("- ").unwrap_or(line).trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::builtin_options;
    use cue_doc::MemoryDocument;

    fn option(id: &str) -> MenuOption {
        builtin_options().into_iter().find(|o| o.id == id).unwrap()
    }

    fn fixture() -> (MemoryDocument, DispatchTarget) {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page("Page");
        let parent = doc.push_child(&page, "Parent").unwrap();
        let target = doc.push_child(&parent, "Anchor").unwrap();
        let at = DispatchTarget {
            target,
            parent: Some(parent),
            page: Some(page),
        };
        (doc, at)
    }

    fn child_texts(doc: &MemoryDocument, id: &NodeId) -> Vec<String> {
        doc.children(id).into_iter().map(|c| c.text).collect()
    }

    #[test]
    fn test_reverse_insert_keeps_order() {
        let (mut doc, at) = fixture();
        let reply = BackendReply::Text("first\nsecond\nthird".to_string());
        let mutations = plan(&option("completion_default"), Some(&reply), &at);
        assert_eq!(apply(&mut doc, mutations).unwrap(), 3);
        assert_eq!(child_texts(&doc, &at.target), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_insert_strips_bullets_and_blanks() {
        let (mut doc, at) = fixture();
        let reply = BackendReply::Text("- one\n\n   \n-  two \nthree".to_string());
        apply(&mut doc, plan(&option("bullet_ideas"), Some(&reply), &at)).unwrap();
        assert_eq!(child_texts(&doc, &at.target), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_insert_lands_before_existing_children() {
        let (mut doc, at) = fixture();
        doc.push_child(&at.target, "existing").unwrap();
        let reply = BackendReply::Text("a\nb".to_string());
        apply(&mut doc, plan(&option("completion_default"), Some(&reply), &at)).unwrap();
        assert_eq!(child_texts(&doc, &at.target), vec!["a", "b", "existing"]);
    }

    #[test]
    fn test_replace_parent_uses_first_line() {
        let (mut doc, at) = fixture();
        let reply = BackendReply::Text("\nShort summary\nignored".to_string());
        let mutations = plan(&option("summarize_parent"), Some(&reply), &at);
        assert_eq!(mutations.len(), 1);
        apply(&mut doc, mutations).unwrap();
        let parent = at.parent.clone().unwrap();
        assert_eq!(doc.node_text(&parent).as_deref(), Some("Short summary"));
        assert!(doc.children(&at.target).is_empty());
    }

    #[test]
    fn test_chat_reply_appended_to_page() {
        let (mut doc, at) = fixture();
        let reply = BackendReply::Chat("Hello there".to_string());
        apply(&mut doc, plan(&option("chat"), Some(&reply), &at)).unwrap();
        let page = at.page.clone().unwrap();
        let texts = child_texts(&doc, &page);
        assert_eq!(texts.last().map(String::as_str), Some("[assistant]: Hello there"));
    }

    #[test]
    fn test_image_reply() {
        let (mut doc, at) = fixture();
        let reply = BackendReply::Image(Some("https://img.example/cat.png".to_string()));
        apply(&mut doc, plan(&option("image"), Some(&reply), &at)).unwrap();
        assert_eq!(child_texts(&doc, &at.target), vec!["![](https://img.example/cat.png)"]);

        assert!(plan(&option("image"), Some(&BackendReply::Image(None)), &at).is_empty());
    }

    #[test]
    fn test_error_reply_plans_nothing() {
        let (_, at) = fixture();
        let reply = BackendReply::Error("quota".to_string());
        for id in ["completion_default", "chat", "image", "summarize_parent"] {
            assert!(plan(&option(id), Some(&reply), &at).is_empty());
        }
    }

    #[test]
    fn test_new_chat_page_link() {
        let (mut doc, at) = fixture();
        apply(&mut doc, plan(&option("open_chat_page"), None, &at)).unwrap();
        let texts = child_texts(&doc, &at.target);
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("[[ChatRoom "));
        assert!(texts[0].ends_with("]]"));
    }

    #[test]
    fn test_mismatched_reply_plans_nothing() {
        let (_, at) = fixture();
        let reply = BackendReply::Chat("wrong shape".to_string());
        assert!(plan(&option("completion_default"), Some(&reply), &at).is_empty());
    }

    #[test]
    fn test_apply_stops_at_first_failure() {
        let (mut doc, at) = fixture();
        let mutations = vec![
            Mutation::Create(NewNode::append(at.target.clone(), "kept")),
            Mutation::Update {
                id: NodeId::from("missing"),
                text: "x".to_string(),
            },
            Mutation::Create(NewNode::append(at.target.clone(), "never")),
        ];
        assert!(apply(&mut doc, mutations).is_err());
        assert_eq!(child_texts(&doc, &at.target), vec!["kept"]);
    }
}
