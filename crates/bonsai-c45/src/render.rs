//! Plain-text rendering of a fitted tree.

use std::fmt;

use crate::gain::PRECISION;
use crate::node::{NodeIndex, NodeKind};
use crate::tree::TreeModel;

/// Indented rule listing of a tree, one branch per line.
///
/// Discrete branches print as `attr = value`, continuous ones as
/// `attr <= cut` / `attr > cut`; leaves append `: class (weight)` with a
/// `/errors` suffix when the leaf still misclassifies training weight.
pub struct PlainView<'a> {
    model: &'a TreeModel,
}

impl TreeModel {
    /// Return a [`Display`](fmt::Display) wrapper rendering the tree as an
    /// indented rule listing.
    #[must_use]
    pub fn plain_view(&self) -> PlainView<'_> {
        PlainView { model: self }
    }
}

impl PlainView<'_> {
    fn write_branches(
        &self,
        f: &mut fmt::Formatter<'_>,
        index: NodeIndex,
        depth: usize,
    ) -> fmt::Result {
        let schema = self.model.schema();
        if let NodeKind::Internal {
            attribute,
            cut,
            children,
            ..
        } = self.model.node(index).kind()
        {
            let spec = schema.attribute(attribute.index());
            for (branch, &child) in children.iter().enumerate() {
                for _ in 0..depth {
                    f.write_str("|   ")?;
                }
                match cut {
                    Some(cut) if branch == 0 => write!(f, "{} <= {}", spec.name(), cut.value)?,
                    Some(cut) => write!(f, "{} > {}", spec.name(), cut.value)?,
                    None => write!(f, "{} = {}", spec.name(), spec.values()[branch])?,
                }
                if self.model.node(child).is_leaf() {
                    self.write_leaf(f, child)?;
                    writeln!(f)?;
                } else {
                    writeln!(f, ":")?;
                    self.write_branches(f, child, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    fn write_leaf(&self, f: &mut fmt::Formatter<'_>, index: NodeIndex) -> fmt::Result {
        let content = self.model.node(index).content();
        let label = &self.model.schema().class_values()[content.classification()];
        write!(f, ": {label} ({:.1}", content.total_weight())?;
        if content.leaf_error() > PRECISION {
            write!(f, "/{:.1}", content.leaf_error())?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for PlainView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = self.model.root();
        if self.model.node(root).is_leaf() {
            self.write_leaf(f, root)?;
            writeln!(f)
        } else {
            self.write_branches(f, root, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::C45Config;
    use crate::testdata;

    #[test]
    fn weather_renders_the_classic_ruleset() {
        let dataset = testdata::weather();
        let model = C45Config::new().with_pruning(false).fit(&dataset).unwrap();
        let rendered = model.plain_view().to_string();
        let expected = "\
outlook = sunny:
|   humidity <= 80: yes (2.0)
|   humidity > 80: no (3.0)
outlook = overcast: yes (4.0)
outlook = rain:
|   windy = true: no (2.0)
|   windy = false: yes (3.0)
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn continuous_branches_show_the_cut() {
        let model = C45Config::new()
            .with_min_split_weight(2.0)
            .with_pruning(false)
            .fit(&testdata::separable())
            .unwrap();
        let rendered = model.plain_view().to_string();
        assert_eq!(rendered, "size <= 5: a (3.0)\nsize > 5: b (3.0)\n");
    }

    #[test]
    fn fractional_weights_and_errors_round_to_tenths() {
        let model = C45Config::new()
            .with_pruning(false)
            .fit(&testdata::missing_split())
            .unwrap();
        let rendered = model.plain_view().to_string();
        assert_eq!(rendered, "a = u: yes (3.4)\na = v: no (4.6/0.6)\n");
    }

    #[test]
    fn leaf_only_tree_renders_one_line() {
        let model = C45Config::new()
            .with_min_split_weight(100.0)
            .fit(&testdata::weather())
            .unwrap();
        assert_eq!(model.plain_view().to_string(), ": yes (14.0/6.8)\n");
    }
}
