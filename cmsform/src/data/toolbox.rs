use crate::{data::field::FieldType, dnd::DragSource};

/// Palette entry that creates a field when clicked or dropped on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolItem {
    pub field_type: FieldType,
    pub label: &'static str,
    pub icon: &'static str,
}

impl ToolItem {
    pub fn drag_source(&self) -> DragSource {
        DragSource::Tool {
            field_type: self.field_type,
            label: self.label.to_string(),
        }
    }
}

/// Titled group of palette entries.
#[derive(Debug, Clone, Copy)]
pub struct ToolCategory {
    pub title: &'static str,
    pub items: &'static [ToolItem],
}

const fn tool(field_type: FieldType, label: &'static str, icon: &'static str) -> ToolItem {
    ToolItem {
        field_type,
        label,
        icon,
    }
}

pub const TOOLBOX: &[ToolCategory] = &[
    ToolCategory {
        title: "基础字段 (Basic)",
        items: &[
            tool(FieldType::Text, "单行文本", "T"),
            tool(FieldType::Textarea, "多行文本", "¶"),
            tool(FieldType::Number, "数字", "#"),
            tool(FieldType::Boolean, "布尔值", "✓"),
            tool(FieldType::Datetime, "日期时间", "📅"),
        ],
    },
    ToolCategory {
        title: "媒体与关系 (Media & Rel)",
        items: &[
            tool(FieldType::Media, "图片/文件", "🖼️"),
            tool(FieldType::Relation, "引用关系", "🔗"),
        ],
    },
    ToolCategory {
        title: "高级结构 (Advanced)",
        items: &[
            tool(FieldType::Repeater, "重复列表", "🔁"),
            tool(FieldType::Component, "嵌入组件", "🧩"),
            tool(FieldType::DynamicZone, "动态区域", "🧱"),
        ],
    },
];

/// Field types offered when defining repeater sub-fields.
pub const SUB_FIELD_TYPES: &[FieldType] = &[
    FieldType::Text,
    FieldType::Number,
    FieldType::Boolean,
    FieldType::Media,
    FieldType::Datetime,
];

/// Palette entry for `field_type`, if the toolbox offers one.
pub fn tool_for(field_type: FieldType) -> Option<&'static ToolItem> {
    TOOLBOX
        .iter()
        .flat_map(|c| c.items.iter())
        .find(|t| t.field_type == field_type)
}

/// Icon shown next to a field of `field_type` on the canvas.
pub fn icon_for(field_type: Option<FieldType>) -> &'static str {
    field_type
        .and_then(tool_for)
        .map(|t| t.icon)
        .unwrap_or("❓")
}
