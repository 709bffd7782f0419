//! AST node types
//!
//! The tree is produced by an external parser and deserialized with serde.
//! Every expression is a [`Node`]: a tagged [`NodeKind`] plus a source span.
//! Fields marked `#[serde(skip)]` are annotations written by the semantic
//! analyzer and read by the IR translator; they are never part of the input.

use super::literal::Literal;
use super::span::Span;
use crate::compiler::semantic::{ScopeId, ScopeVar};
use serde::{Deserialize, Serialize};

/// A compiled method: selector, formal arguments and body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodNode {
    pub selector: String,

    #[serde(default)]
    pub arguments: Vec<String>,

    /// Original source text, kept for introspection by the runtime
    #[serde(default)]
    pub source: String,

    pub body: SequenceNode,

    #[serde(default)]
    pub span: Span,

    #[serde(skip)]
    pub scope: Option<ScopeId>,
}

impl MethodNode {
    pub fn new(selector: impl Into<String>, arguments: Vec<String>, body: SequenceNode) -> Self {
        Self {
            selector: selector.into(),
            arguments,
            source: String::new(),
            body,
            span: Span::default(),
            scope: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// Temporaries declaration followed by statements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceNode {
    #[serde(default)]
    pub temps: Vec<String>,

    #[serde(default)]
    pub statements: Vec<Node>,
}

impl SequenceNode {
    pub fn new(temps: Vec<String>, statements: Vec<Node>) -> Self {
        Self { temps, statements }
    }

    pub fn statements(statements: Vec<Node>) -> Self {
        Self {
            temps: Vec::new(),
            statements,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,

    #[serde(default)]
    pub span: Span,

    /// Set when the translator must evaluate this node into a temporary
    #[serde(skip)]
    pub should_be_aliased: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// [:x | ...]
    Block(BlockNode),

    /// receiver selector: arg
    Send(SendNode),

    /// receiver foo; bar: 1; baz
    Cascade(CascadeNode),

    /// x := value
    Assignment(AssignmentNode),

    /// ^ value
    Return(ReturnNode),

    /// Identifier
    Variable(VariableNode),

    /// Capitalized identifier naming a global class
    ClassReference(VariableNode),

    /// { a. b. c }
    DynamicArray(DynamicArrayNode),

    /// #{ k -> v }
    DynamicDictionary(DynamicDictionaryNode),

    Literal(LiteralNode),

    /// <inline target code>
    Verbatim(VerbatimNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    #[serde(default)]
    pub parameters: Vec<String>,

    #[serde(default)]
    pub body: SequenceNode,

    #[serde(skip)]
    pub scope: Option<ScopeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendNode {
    pub receiver: Box<Node>,

    #[serde(flatten)]
    pub message: MessageNode,
}

/// Selector and arguments of a send; cascades hold one per message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageNode {
    pub selector: String,

    #[serde(default)]
    pub arguments: Vec<Node>,

    #[serde(skip)]
    pub super_send: bool,

    /// 1-based occurrence number among sends of the same selector
    #[serde(skip)]
    pub index: usize,

    #[serde(skip)]
    pub should_be_inlined: bool,
}

impl MessageNode {
    pub fn new(selector: impl Into<String>, arguments: Vec<Node>) -> Self {
        Self {
            selector: selector.into(),
            arguments,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeNode {
    pub receiver: Box<Node>,
    pub messages: Vec<MessageNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentNode {
    pub target: Box<Node>,
    pub value: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnNode {
    pub value: Box<Node>,

    /// Scope the `^` appears in
    #[serde(skip)]
    pub scope: Option<ScopeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableNode {
    pub name: String,

    #[serde(skip)]
    pub binding: Option<ScopeVar>,
}

impl VariableNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicArrayNode {
    #[serde(default)]
    pub elements: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicDictionaryNode {
    #[serde(default)]
    pub entries: Vec<(Node, Node)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralNode {
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbatimNode {
    pub source: String,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            span: Span::default(),
            should_be_aliased: false,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Variable(VariableNode::new(name)))
    }

    pub fn class_reference(name: impl Into<String>) -> Self {
        Self::new(NodeKind::ClassReference(VariableNode::new(name)))
    }

    pub fn literal(value: Literal) -> Self {
        Self::new(NodeKind::Literal(LiteralNode { value }))
    }

    pub fn integer(value: i64) -> Self {
        Self::literal(Literal::Integer(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(Literal::String(value.into()))
    }

    pub fn nil() -> Self {
        Self::literal(Literal::Nil)
    }

    pub fn send(receiver: Node, selector: impl Into<String>, arguments: Vec<Node>) -> Self {
        Self::new(NodeKind::Send(SendNode {
            receiver: Box::new(receiver),
            message: MessageNode::new(selector, arguments),
        }))
    }

    pub fn cascade(receiver: Node, messages: Vec<MessageNode>) -> Self {
        Self::new(NodeKind::Cascade(CascadeNode {
            receiver: Box::new(receiver),
            messages,
        }))
    }

    pub fn assign(name: impl Into<String>, value: Node) -> Self {
        Self::new(NodeKind::Assignment(AssignmentNode {
            target: Box::new(Self::variable(name)),
            value: Box::new(value),
        }))
    }

    pub fn returning(value: Node) -> Self {
        Self::new(NodeKind::Return(ReturnNode {
            value: Box::new(value),
            scope: None,
        }))
    }

    pub fn block(parameters: Vec<String>, body: SequenceNode) -> Self {
        Self::new(NodeKind::Block(BlockNode {
            parameters,
            body,
            scope: None,
        }))
    }

    pub fn dynamic_array(elements: Vec<Node>) -> Self {
        Self::new(NodeKind::DynamicArray(DynamicArrayNode { elements }))
    }

    pub fn dynamic_dictionary(entries: Vec<(Node, Node)>) -> Self {
        Self::new(NodeKind::DynamicDictionary(DynamicDictionaryNode { entries }))
    }

    pub fn verbatim(source: impl Into<String>) -> Self {
        Self::new(NodeKind::Verbatim(VerbatimNode {
            source: source.into(),
        }))
    }

    pub fn is_return(&self) -> bool {
        matches!(self.kind, NodeKind::Return(_))
    }

    pub fn is_assignment(&self) -> bool {
        matches!(self.kind, NodeKind::Assignment(_))
    }

    pub fn is_cascade(&self) -> bool {
        matches!(self.kind, NodeKind::Cascade(_))
    }

    /// Variable name when this is a plain identifier
    pub fn variable_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Variable(var) | NodeKind::ClassReference(var) => Some(&var.name),
            _ => None,
        }
    }

    /// Evaluating this node has no side effects and its value cannot change
    /// between evaluations, so it never needs a temporary.
    pub fn is_immutable(&self) -> bool {
        match &self.kind {
            NodeKind::Literal(_) | NodeKind::Block(_) => true,
            NodeKind::Variable(var) | NodeKind::ClassReference(var) => var
                .binding
                .as_ref()
                .map(|binding| binding.is_immutable())
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn should_be_inlined(&self) -> bool {
        match &self.kind {
            NodeKind::Send(send) => send.message.should_be_inlined,
            NodeKind::Cascade(cascade) => cascade.messages.iter().any(|m| m.should_be_inlined),
            _ => false,
        }
    }

    /// Whether this node, or anything evaluated as part of it, forces the
    /// translator to alias it. Cascades are always hoisted. Blocks are
    /// opaque: their bodies run later.
    pub fn subtree_needs_aliasing(&self) -> bool {
        if self.should_be_aliased || self.should_be_inlined() {
            return true;
        }
        match &self.kind {
            NodeKind::Cascade(_) => true,
            NodeKind::Block(_) => false,
            _ => self.children().iter().any(|child| child.subtree_needs_aliasing()),
        }
    }

    /// Direct subexpressions in evaluation order
    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::Send(send) => std::iter::once(send.receiver.as_ref())
                .chain(send.message.arguments.iter())
                .collect(),
            NodeKind::Cascade(cascade) => std::iter::once(cascade.receiver.as_ref())
                .chain(cascade.messages.iter().flat_map(|m| m.arguments.iter()))
                .collect(),
            NodeKind::Assignment(assignment) => {
                vec![assignment.target.as_ref(), assignment.value.as_ref()]
            }
            NodeKind::Return(ret) => vec![ret.value.as_ref()],
            NodeKind::DynamicArray(array) => array.elements.iter().collect(),
            NodeKind::DynamicDictionary(dict) => dict
                .entries
                .iter()
                .flat_map(|(key, value)| [key, value])
                .collect(),
            NodeKind::Block(block) => block.body.statements.iter().collect(),
            NodeKind::Variable(_)
            | NodeKind::ClassReference(_)
            | NodeKind::Literal(_)
            | NodeKind::Verbatim(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_send_with_flattened_message() {
        let json = r#"{
            "type": "Send",
            "receiver": {"type": "Variable", "name": "a"},
            "selector": "max:",
            "arguments": [{"type": "Literal", "value": {"kind": "Integer", "value": 3}}],
            "span": {"start": 0, "end": 8, "line": 1, "column": 1}
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.span, Span::new(0, 8, 1, 1));
        match node.kind {
            NodeKind::Send(send) => {
                assert_eq!(send.message.selector, "max:");
                assert_eq!(send.receiver.variable_name(), Some("a"));
                assert_eq!(send.message.arguments, vec![Node::integer(3)]);
                assert_eq!(send.message.index, 0);
            }
            other => panic!("expected send, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_block_defaults() {
        let json = r#"{"type": "Block", "body": {"statements": []}}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node, Node::block(vec![], SequenceNode::default()));
    }

    #[test]
    fn test_subtree_needs_aliasing_stops_at_blocks() {
        let mut inner = Node::send(Node::variable("x"), "foo", vec![]);
        inner.should_be_aliased = true;
        let block = Node::block(vec![], SequenceNode::statements(vec![inner.clone()]));
        assert!(!block.subtree_needs_aliasing());

        let send = Node::send(Node::variable("y"), "bar:", vec![inner]);
        assert!(send.subtree_needs_aliasing());
    }

    #[test]
    fn test_cascade_operand_needs_aliasing() {
        let cascade = Node::cascade(
            Node::variable("self"),
            vec![MessageNode::new("qux", vec![]), MessageNode::new("quux", vec![])],
        );
        assert!(cascade.subtree_needs_aliasing());

        let send = Node::send(Node::variable("x"), "foo:", vec![cascade]);
        assert!(send.subtree_needs_aliasing());
    }

    #[test]
    fn test_unbound_variable_is_mutable() {
        assert!(!Node::variable("x").is_immutable());
        assert!(Node::integer(1).is_immutable());
        assert!(Node::block(vec![], SequenceNode::default()).is_immutable());
    }
}
