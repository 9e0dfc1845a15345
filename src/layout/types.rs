#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn inset(&self, pad: f32) -> Self {
        let pad = pad.max(0.0);
        Self {
            x: self.x + pad,
            y: self.y + pad,
            width: (self.width - pad * 2.0).max(0.0),
            height: (self.height - pad * 2.0).max(0.0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Square rect of side `side` centered on `(cx, cy)`.
    pub fn centered_square(cx: f32, cy: f32, side: f32) -> Self {
        Self {
            x: cx - side / 2.0,
            y: cy - side / 2.0,
            width: side,
            height: side,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

impl TextBlock {
    pub fn empty() -> Self {
        Self {
            lines: vec![String::new()],
            width: 0.0,
            height: 0.0,
        }
    }
}

/// Identity of a visual element across render cycles. Two elements in
/// different scenes represent the same logical entity iff their keys are
/// equal; the diff matches on this and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKey {
    Cell { row: String, column: String },
    Node { id: String },
    Group { cell: Option<(String, String)>, key: String },
    Overflow { row: String, column: String },
    Drawer { subject: String },
}

#[derive(Debug, Clone)]
pub struct HeaderLayout {
    pub title: Option<TextBlock>,
    pub title_height: f32,
    /// Column label band along the top of the grid, 0 when omitted.
    pub column_band_height: f32,
    /// Row label band along the leading edge, 0 when omitted.
    pub row_band_width: f32,
    pub column_labels: Vec<Option<TextBlock>>,
    pub row_labels: Vec<Option<TextBlock>>,
}

impl HeaderLayout {
    pub fn none(row_count: usize, column_count: usize) -> Self {
        Self {
            title: None,
            title_height: 0.0,
            column_band_height: 0.0,
            row_band_width: 0.0,
            column_labels: vec![None; column_count],
            row_labels: vec![None; row_count],
        }
    }
}

#[derive(Debug, Clone)]
pub struct CellLayout {
    pub row: usize,
    pub column: usize,
    pub row_id: String,
    pub column_id: String,
    /// Outer rect, tiling the content area exactly.
    pub rect: Rect,
    /// Inner rect nodes and bubbles are placed in.
    pub content: Rect,
    pub label: Option<TextBlock>,
    pub fill: Option<String>,
    pub border: Option<String>,
    pub maximized: bool,
    pub visible_count: usize,
    /// Set when the cell renders a count label instead of nodes, either by
    /// option or because no node fits.
    pub counts_only: bool,
    pub count_label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: String,
    pub row_id: String,
    pub column_id: String,
    pub rect: Rect,
    pub color: Option<String>,
    pub indicator_color: Option<String>,
    pub icon: Option<String>,
    pub indicator_icon: Option<String>,
    pub label: Option<TextBlock>,
    pub secondary_label: Option<TextBlock>,
    pub highlighted: bool,
    pub selected: bool,
    /// True when the node sits at an explicit fractional position instead of
    /// a packing slot.
    pub positioned: bool,
}

#[derive(Debug, Clone)]
pub struct GroupBubble {
    pub key: String,
    pub is_other: bool,
    /// Scope cell for within-cell grouping; `None` for across-cells.
    pub cell: Option<(String, String)>,
    pub center: (f32, f32),
    pub side: f32,
    pub color: String,
    pub member_ids: Vec<String>,
    pub highlighted_count: usize,
    pub label: Option<TextBlock>,
}

impl GroupBubble {
    pub fn rect(&self) -> Rect {
        Rect::centered_square(self.center.0, self.center.1, self.side.max(0.0))
    }

    pub fn member_count(&self) -> usize {
        self.member_ids.len()
    }
}

#[derive(Debug, Clone)]
pub struct OverflowBadge {
    pub row_id: String,
    pub column_id: String,
    pub rect: Rect,
    /// Nodes pushed out of the packing grid, shown as "+N".
    pub hidden_count: usize,
}

#[derive(Debug, Clone)]
pub struct DrawerLayout {
    /// Group key the drawer expands.
    pub subject: String,
    pub rect: Rect,
    pub header: Rect,
    pub content: Rect,
    pub title: Option<TextBlock>,
    pub nodes: Vec<NodeLayout>,
    /// Total member grid height; exceeds `content.height` when the drawer
    /// scrolls.
    pub scroll_height: f32,
}

/// A node assigned to a cell but not drawn there: pushed into overflow or
/// suppressed by a counts-only cell. The diff uses this to aim delete tweens
/// at the right slot.
#[derive(Debug, Clone, PartialEq)]
pub struct UnplacedNode {
    pub id: String,
    pub row_id: String,
    pub column_id: String,
}

/// Borrowed view over any scene element. Closed set; behavior dispatches by
/// matching, never by downcasting.
#[derive(Debug, Clone, Copy)]
pub enum Element<'a> {
    Cell(&'a CellLayout),
    Node(&'a NodeLayout),
    Group(&'a GroupBubble),
    Overflow(&'a OverflowBadge),
    Drawer(&'a DrawerLayout),
}

impl Element<'_> {
    pub fn key(&self) -> ElementKey {
        match self {
            Element::Cell(cell) => ElementKey::Cell {
                row: cell.row_id.clone(),
                column: cell.column_id.clone(),
            },
            Element::Node(node) => ElementKey::Node {
                id: node.id.clone(),
            },
            Element::Group(group) => ElementKey::Group {
                cell: group.cell.clone(),
                key: group.key.clone(),
            },
            Element::Overflow(badge) => ElementKey::Overflow {
                row: badge.row_id.clone(),
                column: badge.column_id.clone(),
            },
            Element::Drawer(drawer) => ElementKey::Drawer {
                subject: drawer.subject.clone(),
            },
        }
    }

    pub fn rect(&self) -> Rect {
        match self {
            Element::Cell(cell) => cell.rect,
            Element::Node(node) => node.rect,
            Element::Group(group) => group.rect(),
            Element::Overflow(badge) => badge.rect,
            Element::Drawer(drawer) => drawer.rect,
        }
    }

    pub fn fill(&self) -> Option<&str> {
        match self {
            Element::Cell(cell) => cell.fill.as_deref(),
            Element::Node(node) => node.color.as_deref(),
            Element::Group(group) => Some(group.color.as_str()),
            Element::Overflow(_) => None,
            Element::Drawer(_) => None,
        }
    }
}

/// The complete result of one layout pass. Scenes own their data outright;
/// the diff animator holds the previous scene and the new one as separate
/// values for the duration of a transition.
#[derive(Debug, Clone)]
pub struct Scene {
    pub canvas: Rect,
    /// Canvas minus header bands; cells tile this rect exactly.
    pub content: Rect,
    pub row_count: usize,
    pub column_count: usize,
    pub headers: HeaderLayout,
    pub cells: Vec<CellLayout>,
    pub nodes: Vec<NodeLayout>,
    pub groups: Vec<GroupBubble>,
    pub overflows: Vec<OverflowBadge>,
    pub drawer: Option<DrawerLayout>,
    pub unplaced: Vec<UnplacedNode>,
    /// Uniform node size shared by the whole chart, when nodes are packed.
    pub node_size: Option<(f32, f32)>,
}

impl Scene {
    pub fn empty(canvas: Rect) -> Self {
        Self {
            canvas,
            content: canvas,
            row_count: 0,
            column_count: 0,
            headers: HeaderLayout::none(0, 0),
            cells: Vec::new(),
            nodes: Vec::new(),
            groups: Vec::new(),
            overflows: Vec::new(),
            drawer: None,
            unplaced: Vec::new(),
            node_size: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.column_count == 0
    }

    /// Every element of the scene in draw order. Each element appears exactly
    /// once; the diff relies on that.
    pub fn elements(&self) -> impl Iterator<Item = Element<'_>> {
        self.cells
            .iter()
            .map(Element::Cell)
            .chain(self.nodes.iter().map(Element::Node))
            .chain(self.groups.iter().map(Element::Group))
            .chain(self.overflows.iter().map(Element::Overflow))
            .chain(self.drawer.iter().map(Element::Drawer))
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellLayout> {
        self.cells.get(row * self.column_count + column)
    }

    pub fn find_cell(&self, row_id: &str, column_id: &str) -> Option<&CellLayout> {
        self.cells
            .iter()
            .find(|cell| cell.row_id == row_id && cell.column_id == column_id)
    }

    pub fn find_overflow(&self, row_id: &str, column_id: &str) -> Option<&OverflowBadge> {
        self.overflows
            .iter()
            .find(|badge| badge.row_id == row_id && badge.column_id == column_id)
    }

    /// Bubble that absorbed `node_id`, when grouping merged it away.
    pub fn bubble_containing(&self, node_id: &str) -> Option<&GroupBubble> {
        self.groups
            .iter()
            .find(|group| group.member_ids.iter().any(|id| id == node_id))
    }

    /// Cell a node was assigned to but not drawn in, if any.
    pub fn unplaced_cell_of(&self, node_id: &str) -> Option<(&str, &str)> {
        self.unplaced
            .iter()
            .find(|entry| entry.id == node_id)
            .map(|entry| (entry.row_id.as_str(), entry.column_id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_inset_clamps_to_zero() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let inner = rect.inset(8.0);
        assert_eq!(inner.width, 0.0);
        assert_eq!(inner.height, 0.0);
        assert!(inner.is_empty());
    }

    #[test]
    fn centered_square_roundtrips_center() {
        let rect = Rect::centered_square(10.0, 20.0, 6.0);
        assert_eq!(rect.center(), (10.0, 20.0));
        assert_eq!(rect.width, 6.0);
    }

    #[test]
    fn empty_scene_has_no_elements() {
        let scene = Scene::empty(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(scene.elements().count(), 0);
        assert!(scene.is_empty());
    }
}
