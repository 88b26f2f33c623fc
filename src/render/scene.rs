use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::core::format_number;
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Group,
    Defs,
    ClipPath,
    Rect,
    Circle,
    Line,
    Path,
    Text,
}

impl NodeKind {
    /// SVG element name.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Root => "svg",
            Self::Group => "g",
            Self::Defs => "defs",
            Self::ClipPath => "clipPath",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Line => "line",
            Self::Path => "path",
            Self::Text => "text",
        }
    }

    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Root | Self::Group | Self::Defs | Self::ClipPath)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f64),
    Text(String),
}

impl AttrValue {
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.parse().ok(),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => f.write_str(&format_number(round_attr(*value))),
            Self::Text(text) => f.write_str(text),
        }
    }
}

fn round_attr(value: f64) -> f64 {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Model element a node was created for, so callbacks can find their data.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Point { plot_id: usize, index: usize },
    Slab(usize),
    Rollout(usize),
    HeatmapCell { plot_id: usize, index: usize },
    LegendEntry(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub classes: SmallVec<[String; 2]>,
    pub attrs: IndexMap<String, AttrValue>,
    pub styles: IndexMap<String, AttrValue>,
    pub text: Option<String>,
    pub datum: Option<Datum>,
    alive: bool,
}

impl SceneNode {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            classes: SmallVec::new(),
            attrs: IndexMap::new(),
            styles: IndexMap::new(),
            text: None,
            datum: None,
            alive: true,
        }
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    #[must_use]
    pub fn attr_f64(&self, name: &str) -> Option<f64> {
        self.attrs.get(name).and_then(AttrValue::as_f64)
    }

    #[must_use]
    pub fn style_f64(&self, name: &str) -> Option<f64> {
        self.styles.get(name).and_then(AttrValue::as_f64)
    }
}

/// Retained 2-D scene: the drawing surface every render step writes into.
///
/// Removed slots are recycled, so ids of removed nodes must not be kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    free: Vec<usize>,
    width: f64,
    height: f64,
}

const ROOT: NodeId = NodeId(0);

impl Scene {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            nodes: vec![SceneNode::new(NodeKind::Root, None)],
            free: Vec::new(),
            width,
            height,
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        ROOT
    }

    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Drops every node except the root.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.free.clear();
        self.nodes[0].children.clear();
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0).filter(|n| n.alive)
    }

    fn node_mut(&mut self, id: NodeId) -> ChartResult<&mut SceneNode> {
        self.nodes
            .get_mut(id.0)
            .filter(|n| n.alive)
            .ok_or_else(|| ChartError::Scene(format!("node {} does not exist", id.0)))
    }

    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> ChartResult<NodeId> {
        let parent_kind = self.node_mut(parent)?.kind;
        if !parent_kind.is_container() {
            return Err(ChartError::Scene(format!(
                "cannot append a `{}` to a `{}`",
                kind.tag(),
                parent_kind.tag()
            )));
        }

        let node = SceneNode::new(kind, Some(parent));
        let id = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                NodeId(slot)
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        };
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    pub fn set_attr(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> ChartResult<()> {
        let value = value.into();
        if let AttrValue::Number(number) = value {
            if !number.is_finite() {
                return Err(ChartError::Scene(format!(
                    "attribute `{name}` must be finite"
                )));
            }
        }
        self.node_mut(id)?.attrs.insert(name.to_owned(), value);
        Ok(())
    }

    pub fn set_style(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> ChartResult<()> {
        self.node_mut(id)?
            .styles
            .insert(name.to_owned(), value.into());
        Ok(())
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> ChartResult<()> {
        self.node_mut(id)?.text = Some(text.into());
        Ok(())
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> ChartResult<()> {
        let node = self.node_mut(id)?;
        for part in class.split_whitespace() {
            if !node.has_class(part) {
                node.classes.push(part.to_owned());
            }
        }
        Ok(())
    }

    pub fn bind(&mut self, id: NodeId, datum: Datum) -> ChartResult<()> {
        self.node_mut(id)?.datum = Some(datum);
        Ok(())
    }

    /// Detaches `id` and frees it together with its subtree.
    pub fn remove(&mut self, id: NodeId) -> ChartResult<()> {
        if id == ROOT {
            return Err(ChartError::Scene("the root cannot be removed".to_owned()));
        }
        let parent = self.node_mut(id)?.parent;
        if let Some(parent) = parent {
            if let Ok(parent) = self.node_mut(parent) {
                parent.children.retain(|child| *child != id);
            }
        }
        self.release(id);
        Ok(())
    }

    pub fn remove_children(&mut self, id: NodeId) -> ChartResult<()> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in children {
            self.release(child);
        }
        Ok(())
    }

    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).filter(|n| n.alive) {
                node.alive = false;
                stack.extend(node.children.drain(..));
                self.free.push(current.0);
            }
        }
    }

    /// Moves `id` to the front of its parent so it paints below its siblings.
    pub fn lower(&mut self, id: NodeId) -> ChartResult<()> {
        let parent = self
            .node_mut(id)?
            .parent
            .ok_or_else(|| ChartError::Scene("the root cannot be lowered".to_owned()))?;
        let siblings = &mut self.node_mut(parent)?.children;
        siblings.retain(|child| *child != id);
        siblings.insert(0, id);
        Ok(())
    }

    /// Moves `id` to the end of its parent so it paints above its siblings.
    pub fn raise(&mut self, id: NodeId) -> ChartResult<()> {
        let parent = self
            .node_mut(id)?
            .parent
            .ok_or_else(|| ChartError::Scene("the root cannot be raised".to_owned()))?;
        let siblings = &mut self.node_mut(parent)?.children;
        siblings.retain(|child| *child != id);
        siblings.push(id);
        Ok(())
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Live nodes below `from` (inclusive) in document order.
    #[must_use]
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    #[must_use]
    pub fn select_class(&self, class: &str) -> Vec<NodeId> {
        self.select_class_within(ROOT, class)
    }

    #[must_use]
    pub fn select_class_within(&self, from: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(from)
            .into_iter()
            .filter(|id| self.node(*id).is_some_and(|n| n.has_class(class)))
            .collect()
    }

    #[must_use]
    pub fn count(&self, kind: NodeKind) -> usize {
        self.descendants(ROOT)
            .into_iter()
            .filter(|id| self.node(*id).is_some_and(|n| n.kind == kind))
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.width.is_finite() || !self.height.is_finite() {
            return Err(ChartError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        for id in self.descendants(ROOT) {
            if let Some(node) = self.node(id) {
                for (name, value) in &node.attrs {
                    if value.as_f64().is_some_and(|v| !v.is_finite()) {
                        return Err(ChartError::Scene(format!(
                            "attribute `{name}` of a `{}` is not finite",
                            node.kind.tag()
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Datum, NodeKind, Scene};

    #[test]
    fn append_bind_and_select_by_class() {
        let mut scene = Scene::new(100.0, 50.0);
        let group = scene.append(scene.root(), NodeKind::Group).expect("group");
        let dot = scene.append(group, NodeKind::Circle).expect("circle");
        scene.add_class(dot, "dot OZE").expect("class");
        scene
            .bind(dot, Datum::Point { plot_id: 0, index: 3 })
            .expect("bind");

        assert_eq!(scene.select_class("OZE"), vec![dot]);
        assert_eq!(
            scene.node(dot).and_then(|n| n.datum.clone()),
            Some(Datum::Point { plot_id: 0, index: 3 })
        );
    }

    #[test]
    fn leaves_cannot_have_children() {
        let mut scene = Scene::new(10.0, 10.0);
        let line = scene.append(scene.root(), NodeKind::Line).expect("line");
        assert!(scene.append(line, NodeKind::Circle).is_err());
    }

    #[test]
    fn remove_frees_subtree_and_slots_are_reused() {
        let mut scene = Scene::new(10.0, 10.0);
        let group = scene.append(scene.root(), NodeKind::Group).expect("group");
        let child = scene.append(group, NodeKind::Rect).expect("rect");
        scene.remove(group).expect("remove");
        assert!(scene.node(group).is_none());
        assert!(scene.node(child).is_none());
        assert!(scene.is_empty());

        let again = scene.append(scene.root(), NodeKind::Group).expect("group");
        assert!(again == group || again == child);
    }

    #[test]
    fn non_finite_attributes_are_rejected() {
        let mut scene = Scene::new(10.0, 10.0);
        let rect = scene.append(scene.root(), NodeKind::Rect).expect("rect");
        assert!(scene.set_attr(rect, "x", f64::NAN).is_err());
        assert!(scene.set_attr(rect, "x", 2.0).is_ok());
    }

    #[test]
    fn lower_moves_node_first() {
        let mut scene = Scene::new(10.0, 10.0);
        let a = scene.append(scene.root(), NodeKind::Group).expect("a");
        let b = scene.append(scene.root(), NodeKind::Group).expect("b");
        scene.lower(b).expect("lower");
        assert_eq!(scene.children(scene.root()), &[b, a]);
    }

    #[test]
    fn raise_moves_node_last() {
        let mut scene = Scene::new(10.0, 10.0);
        let a = scene.append(scene.root(), NodeKind::Group).expect("a");
        let b = scene.append(scene.root(), NodeKind::Group).expect("b");
        scene.raise(a).expect("raise");
        assert_eq!(scene.children(scene.root()), &[b, a]);
        assert!(scene.raise(scene.root()).is_err());
    }
}
