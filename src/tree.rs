/*!
 * Tree-string synthesis
 *
 * Builds a nested textual tree purely from the sorted selection list; no
 * filesystem access. Directory nodes are reconstructed from path
 * separators, and siblings at every level interleave files and
 * directories in case-sensitive alphabetical order.
 */

use std::collections::BTreeMap;

#[derive(Default)]
struct TreeNode {
    children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    fn is_dir(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Render the selected paths as a tree with branch markers.
pub fn generate_tree_string(paths: &[String]) -> String {
    let mut root = TreeNode::default();
    for path in paths {
        let mut node = &mut root;
        for part in path.split('/').filter(|part| !part.is_empty()) {
            node = node.children.entry(part.to_string()).or_default();
        }
    }

    let mut out = String::new();
    render_children(&root, "", &mut out);
    out.trim_end().to_string()
}

fn render_children(node: &TreeNode, prefix: &str, out: &mut String) {
    let count = node.children.len();
    for (index, (name, child)) in node.children.iter().enumerate() {
        let last = index + 1 == count;
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(name);
        if child.is_dir() {
            out.push('/');
        }
        out.push('\n');
        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        render_children(child, &child_prefix, out);
    }
}
