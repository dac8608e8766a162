/*!
# MCS Parser

Structural parser for SMP/E Modification Control Statements.

Parsing runs in two stages: the [`Segmenter`](segmenter::Segmenter) splits
the text into statement spans, comments and inline data, and the
[`TreeBuilder`](builder::TreeBuilder) turns every span into a statement
node using the schema store.

## Usage

```rust
use mcs_analyzer::parser::McsParser;
use mcs_analyzer::schema::SchemaStore;

let schema = SchemaStore::builtin()?;
let document = McsParser::new(&schema).parse("++PTF(UA00001) .\n++VER(Z038) FMID(HBB7790) .");
assert_eq!(document.statement_count(), 2);
# Ok::<(), anyhow::Error>(())
```
*/

pub mod ast;
pub mod builder;
pub mod segmenter;

pub use ast::{
    Arena, Document, LineSpan, Node, NodeId, NodeKind, OperandSchema, ParameterValue, Statement,
};
pub use builder::TreeBuilder;
pub use segmenter::Segmenter;

use crate::schema::SchemaStore;

/// Operands that point at element data outside the MCS stream.
pub const EXTERNAL_DATA_OPERANDS: [&str; 4] = ["FROMDS", "RELFILE", "TXLIB", "LKLIB"];

/// Whether an operand means the statement carries no inline data.
pub fn suppresses_inline_data(operand: &str) -> bool {
    EXTERNAL_DATA_OPERANDS.contains(&operand) || operand == "DELETE"
}

/// Builds [`Document`]s against one schema store.
pub struct McsParser<'s> {
    schema: &'s SchemaStore,
}

impl<'s> McsParser<'s> {
    pub fn new(schema: &'s SchemaStore) -> Self {
        Self { schema }
    }

    /// Parses a complete document. Never fails; problems are kept in the tree.
    pub fn parse(&self, text: &str) -> Document {
        let mut segmenter = Segmenter::new(text);
        let line_widths = segmenter.line_widths();
        let mut builder = TreeBuilder::new(self.schema);

        while let Some(span) = segmenter.next_statement() {
            let id = builder.build(&span);
            if span.terminator.is_some() && builder.expects_inline_data(id) {
                if let Some(data) = segmenter.take_inline_data() {
                    builder.attach_inline_data(id, data);
                }
            }
        }

        let document = builder.finish(segmenter.finish(), line_widths);
        tracing::debug!(
            "Parsed {} statements and {} comments from {} lines",
            document.statement_count(),
            document.comments().len(),
            document.line_count()
        );
        document
    }
}

/// Shorthand for `McsParser::new(schema).parse(text)`.
pub fn parse(text: &str, schema: &SchemaStore) -> Document {
    McsParser::new(schema).parse(text)
}
