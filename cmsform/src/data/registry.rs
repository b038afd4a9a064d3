use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::data::{
    field::{FieldKind, FieldSchema, MediaOptions, RelationOptions, TextOptions},
    model::{ModelIndex, ModelRef},
    schema::{SchemaError, load_file},
};

/// A reusable component that dynamic-zone slots can instantiate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDef {
    pub key: String,
    pub display_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

/// Ordered lookup from component key to component definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ComponentRegistry(Vec<ComponentDef>);

impl ComponentRegistry {
    pub fn new(components: Vec<ComponentDef>) -> Self {
        ComponentRegistry(components)
    }

    pub fn get(&self, key: &str) -> Option<&ComponentDef> {
        self.0.iter().find(|c| c.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentDef> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Layout of a registry file.
///
/// ```toml
/// [[components]]
/// key = "hero_banner"
/// displayName = "Hero"
///
/// [[models]]
/// label = "Author"
/// key = "api::author.author"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RegistryFile {
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    #[serde(default)]
    pub models: Vec<ModelRef>,
}

impl RegistryFile {
    /// Load a registry file. Sections left empty fall back to the built-ins.
    pub fn load(path: &Path) -> Result<(ComponentRegistry, ModelIndex), SchemaError> {
        let file: RegistryFile = load_file(path)?;
        let components = if file.components.is_empty() {
            ComponentRegistry::default()
        } else {
            ComponentRegistry::new(file.components)
        };
        let models = if file.models.is_empty() {
            ModelIndex::default()
        } else {
            ModelIndex::new(file.models)
        };
        Ok((components, models))
    }
}

fn def(key: &str, name: &str, category: &str, description: &str, fields: Vec<FieldSchema>) -> ComponentDef {
    ComponentDef {
        key: key.to_string(),
        display_name: name.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        fields,
    }
}

fn media(multiple: bool) -> FieldKind {
    FieldKind::Media {
        options: MediaOptions {
            multiple,
            allowed_types: Vec::new(),
        },
    }
}

fn text() -> FieldKind {
    FieldKind::Text {
        options: TextOptions::default(),
    }
}

impl Default for ComponentRegistry {
    /// Built-in sample components.
    fn default() -> Self {
        ComponentRegistry(vec![
            def(
                "hero_banner",
                "横幅组件",
                "营销",
                "全宽背景图带标题和按钮",
                vec![
                    FieldSchema::with_id("hero-1", "heading", "标题", text()).with_required(true),
                    FieldSchema::with_id("hero-2", "background_image", "背景图", media(false)),
                    FieldSchema::with_id("hero-3", "datetime", "日期时间", FieldKind::Datetime),
                    FieldSchema::with_id("hero-4", "date", "日期", FieldKind::Date),
                ],
            ),
            def(
                "image_gallery",
                "图片画廊",
                "媒体",
                "多张图片网格展示",
                vec![FieldSchema::with_id("gallery-1", "images", "图片列表", media(true))],
            ),
            def(
                "text",
                "文章内容",
                "基础",
                "标准的文字编辑区域",
                vec![
                    FieldSchema::with_id("text-1", "title", "标题", text()).with_required(true),
                    FieldSchema::with_id("text-2", "cover", "封面", media(false)).with_required(true),
                    FieldSchema::with_id("text-3", "content", "内容", FieldKind::Textarea)
                        .with_required(true),
                    FieldSchema::with_id(
                        "text-4",
                        "author",
                        "作者",
                        FieldKind::Relation {
                            options: RelationOptions {
                                target_model_key: Some("api::author.author".to_string()),
                                ..Default::default()
                            },
                        },
                    )
                    .with_required(true),
                    FieldSchema::with_id("text-5", "datetime", "日期时间", FieldKind::Datetime)
                        .with_required(true),
                ],
            ),
            def("video_player", "视频播放器", "媒体", "嵌入 YouTube 或本地视频", Vec::new()),
            def("newsletter_form", "订阅表单", "功能", "收集用户邮箱", Vec::new()),
            def("cta_button", "行动按钮", "营销", "高转化的跳转按钮", Vec::new()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_registry_is_ordered() {
        let reg = ComponentRegistry::default();
        let keys: Vec<_> = reg.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys[..3], ["hero_banner", "image_gallery", "text"]);
        assert_eq!(reg.get("hero_banner").unwrap().display_name, "横幅组件");
        assert!(reg.get("ghost_key").is_none());
    }

    #[test]
    fn registry_file_falls_back_per_section() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[[components]]
key = "quote"
displayName = "Quote"

[[components.fields]]
id = "quote-1"
key = "body"
label = "Body"
type = "textarea"
required = true
"#
        )
        .unwrap();

        let (components, models) = RegistryFile::load(file.path()).unwrap();
        assert_eq!(components.len(), 1);
        let quote = components.get("quote").unwrap();
        assert_eq!(quote.fields.len(), 1);
        assert_eq!(quote.fields[0].kind, FieldKind::Textarea);
        assert!(models.contains("api::tag.tag"));
    }
}
