/// Terminal chart renderer: an indented tree with sizes and share of parent.
use spacescope_core::model::{format_size, Hierarchy, HierarchyNode};
use spacescope_core::render::ChartRenderer;
use std::io::Write;

pub struct TextChart {
    /// Levels below the roots that are printed.
    pub max_depth: usize,
}

impl TextChart {
    fn write_node<W: Write>(
        &self,
        out: &mut W,
        tree: &Hierarchy,
        node: &HierarchyNode,
        parent_value: Option<u64>,
        depth: usize,
    ) -> std::io::Result<()> {
        let share = match parent_value {
            Some(total) if total > 0 => format!(" ({:.1}%)", node.value as f64 * 100.0 / total as f64),
            _ => String::new(),
        };
        writeln!(
            out,
            "{}{}  {}{}",
            "  ".repeat(depth),
            node.label,
            format_size(node.value),
            share
        )?;
        if depth >= self.max_depth {
            return Ok(());
        }
        for child in tree.children(&node.id) {
            self.write_node(out, tree, child, Some(node.value), depth + 1)?;
        }
        Ok(())
    }
}

impl ChartRenderer for TextChart {
    fn render(&self, nodes: &[HierarchyNode]) -> Result<(), String> {
        let tree = Hierarchy::from_nodes(nodes.to_vec());
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for root in tree.roots() {
            self.write_node(&mut out, &tree, root, None, 0)
                .map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}
