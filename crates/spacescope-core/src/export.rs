/// Export of the flat dataset currently on screen.
///
/// CSV has one row per record (`id,label,parent,value`); JSON is the array
/// of records in the same field naming.
use crate::model::HierarchyNode;
use std::io::Write;

/// Write `nodes` as CSV with a header row.
pub fn write_csv<W: Write>(nodes: &[HierarchyNode], writer: W) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for node in nodes {
        csv_writer.serialize(node)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write `nodes` as a pretty-printed JSON array.
pub fn write_json<W: Write>(nodes: &[HierarchyNode], writer: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, nodes)
}
