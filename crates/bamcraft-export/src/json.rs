//! JSON graph sink
//!
//! Serializes a finished scene graph to JSON. Mainly useful for
//! inspecting conversion output and for tests; the binary container
//! writer lives downstream and implements the same [`GraphSink`] trait.

use std::io::Write;

use bamcraft_core::{Error, Result};
use serde::Serialize;

use crate::graph::{GraphSink, VirtualNode};
use crate::settings::BamVersion;

/// Writes the graph as a single JSON document
pub struct JsonGraphSink<W: Write> {
    writer: W,
    pretty: bool,
}

#[derive(Serialize)]
struct GraphDocument<'a> {
    version: String,
    root: &'a VirtualNode,
}

impl<W: Write> JsonGraphSink<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }

    /// Consume the sink, returning the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> GraphSink for JsonGraphSink<W> {
    fn write_graph(&mut self, root: &VirtualNode, version: BamVersion) -> Result<()> {
        let document = GraphDocument {
            version: version.to_string(),
            root,
        };

        let result = if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &document)
        } else {
            serde_json::to_writer(&mut self.writer, &document)
        };
        result.map_err(|err| Error::External(err.to_string()))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_document_shape() {
        let mut root = VirtualNode::plain("SceneRoot");
        root.add_child(VirtualNode::plain("Cube"));

        let mut sink = JsonGraphSink::new(Vec::new(), false);
        sink.write_graph(&root, BamVersion::new(6, 41)).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["version"], "6.41");
        assert_eq!(value["root"]["name"], "SceneRoot");
        assert_eq!(value["root"]["children"][0]["name"], "Cube");
    }
}
