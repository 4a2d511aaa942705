use crate::selection::SelectMode;

/// What a tool is allowed to do to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub can_paint: bool,
    pub can_fill: bool,
    pub can_select: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
    Bucket { smart: bool, diagonal: bool },
    MagicWand { mode: SelectMode, diagonal: bool },
    /// Drags the floating buffer.
    Move,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::Pen,
        Tool::Eraser,
        Tool::Bucket {
            smart: false,
            diagonal: false,
        },
        Tool::MagicWand {
            mode: SelectMode::Color,
            diagonal: false,
        },
        Tool::Move,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tool::Pen => "Pen",
            Tool::Eraser => "Eraser",
            Tool::Bucket { .. } => "Bucket",
            Tool::MagicWand { .. } => "Magic Wand",
            Tool::Move => "Move",
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            Tool::Pen | Tool::Eraser => Capabilities {
                can_paint: true,
                ..Default::default()
            },
            Tool::Bucket { .. } => Capabilities {
                can_fill: true,
                ..Default::default()
            },
            Tool::MagicWand { .. } => Capabilities {
                can_select: true,
                ..Default::default()
            },
            Tool::Move => Capabilities::default(),
        }
    }

    /// Whether the tool is the same kind as `other`, ignoring its options.
    pub fn same_kind(&self, other: &Tool) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}
