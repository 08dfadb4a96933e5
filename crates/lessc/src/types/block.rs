//! The block tree produced by the parser.
//!
//! Blocks live in an arena owned by [`Stylesheet`] and refer to each other by
//! [`BlockId`]. The tree is pure structure: nothing in it has been evaluated
//! apart from constant folding of concrete arithmetic.

use std::collections::HashMap;

use super::value::Value;

/// Tag prefix that hides a block from output while keeping it invocable.
pub const HIDDEN_PREFIX: char = '$';

/// Index of a block in its [`Stylesheet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(pub usize);

/// One operation inside a block, in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum Prop {
    /// `name: value`. Variable assignments keep their `@`.
    Assign { name: String, value: Value },
    /// A nested rule.
    Block(BlockId),
    /// `path(args);`
    Mixin { path: Vec<String>, args: Vec<Value> },
    /// A line emitted verbatim.
    Raw(String),
    /// An `@import` statement that is passed through to the output.
    Import(String),
    /// `@charset value;`
    Charset(Value),
}

/// A declared mixin parameter, without its `@`.
#[derive(Clone, Debug, PartialEq)]
pub struct ArgDef {
    pub name: String,
    pub default: Option<Value>,
}

/// At-rule kinds. Every kind except [`Special::None`] bypasses selector
/// multiplication.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Special {
    #[default]
    None,
    FontFace,
    /// `@media <query>`
    Media(String),
    /// `@<prefix>keyframes <name>`, prefix like `-webkit-`.
    Keyframes { prefix: String, name: Value },
    /// `from`, `to` or `N%` inside a keyframes block.
    KeyframeStep,
}

#[derive(Clone, Debug, Default)]
pub struct Block {
    /// Raw selectors; empty only for the document root.
    pub tags: Vec<String>,
    pub props: Vec<Prop>,
    /// Closed child blocks by tag; the most recently closed one wins.
    pub children: HashMap<String, BlockId>,
    /// Declared parameters of a parametric mixin.
    pub args: Option<Vec<ArgDef>>,
    /// Lexically enclosing block, `None` for the root.
    pub parent: Option<BlockId>,
    pub special: Special,
}

impl Block {
    /// Hidden blocks (every tag starts with [`HIDDEN_PREFIX`]) and parametric
    /// mixins are never emitted on their own.
    pub fn is_emitted(&self) -> bool {
        self.args.is_none() && !self.tags.iter().all(|t| t.starts_with(HIDDEN_PREFIX))
    }

    /// The last assignment to `name` in this block.
    pub fn assignment(&self, name: &str) -> Option<&Value> {
        self.props.iter().rev().find_map(|prop| match prop {
            Prop::Assign { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }
}

/// A parsed document: the block arena plus its root.
#[derive(Clone, Debug)]
pub struct Stylesheet {
    blocks: Vec<Block>,
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Stylesheet {
    pub const ROOT: BlockId = BlockId(0);

    pub fn new() -> Self {
        Self {
            blocks: vec![Block::default()],
        }
    }

    pub fn root(&self) -> &Block {
        &self.blocks[Self::ROOT.0]
    }

    pub fn get(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub fn get_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0]
    }

    /// Adds a block under `parent` and returns its id. The block is not yet
    /// registered as a child; that happens when it closes.
    pub fn open(&mut self, parent: BlockId, mut block: Block) -> BlockId {
        block.parent = Some(parent);
        self.blocks.push(block);
        BlockId(self.blocks.len() - 1)
    }

    /// Registers a closed block with its parent.
    pub fn close(&mut self, id: BlockId) {
        let Some(parent) = self.blocks[id.0].parent else {
            return;
        };
        let tags = self.blocks[id.0].tags.clone();
        let emitted = self.blocks[id.0].is_emitted();

        let parent = &mut self.blocks[parent.0];
        if emitted {
            parent.props.push(Prop::Block(id));
        }
        for tag in tags {
            parent.children.insert(tag, id);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.blocks.len()
    }
}
