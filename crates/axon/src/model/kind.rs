//! Discriminants for every element and relationship kind, with their type tags.

use std::{borrow::Cow, fmt};

use super::schema::{self, AttributeDef, AttributeSlot};

/// The composite layer kinds that own attribute children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Conv1D,
    Conv2D,
    Conv3D,
    Pooling,
    Rnn,
    Lstm,
    Gru,
    Linear,
    Flatten,
    Embedding,
    Dropout,
    LayerNormalization,
    BatchNormalization,
    TensorOp,
    Configuration,
}

impl LayerKind {
    pub const ALL: [LayerKind; 15] = [
        LayerKind::Conv1D,
        LayerKind::Conv2D,
        LayerKind::Conv3D,
        LayerKind::Pooling,
        LayerKind::Rnn,
        LayerKind::Lstm,
        LayerKind::Gru,
        LayerKind::Linear,
        LayerKind::Flatten,
        LayerKind::Embedding,
        LayerKind::Dropout,
        LayerKind::LayerNormalization,
        LayerKind::BatchNormalization,
        LayerKind::TensorOp,
        LayerKind::Configuration,
    ];

    /// Suffix shared by the layer's attribute type tags.
    pub fn suffix(self) -> &'static str {
        match self {
            LayerKind::Conv1D => "Conv1D",
            LayerKind::Conv2D => "Conv2D",
            LayerKind::Conv3D => "Conv3D",
            LayerKind::Pooling => "Pooling",
            LayerKind::Rnn => "RNN",
            LayerKind::Lstm => "LSTM",
            LayerKind::Gru => "GRU",
            LayerKind::Linear => "Linear",
            LayerKind::Flatten => "Flatten",
            LayerKind::Embedding => "Embedding",
            LayerKind::Dropout => "Dropout",
            LayerKind::LayerNormalization => "LayerNormalization",
            LayerKind::BatchNormalization => "BatchNormalization",
            LayerKind::TensorOp => "TensorOp",
            LayerKind::Configuration => "Configuration",
        }
    }

    pub fn type_tag(self) -> Cow<'static, str> {
        match self {
            LayerKind::TensorOp | LayerKind::Configuration => Cow::Borrowed(self.suffix()),
            _ => Cow::Owned(format!("{}Layer", self.suffix())),
        }
    }

    pub fn default_name(self) -> Cow<'static, str> {
        match self {
            LayerKind::TensorOp | LayerKind::Configuration => Cow::Borrowed(self.suffix()),
            _ => Cow::Owned(format!("{} Layer", self.suffix())),
        }
    }

    pub fn from_type_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_tag() == tag)
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.suffix() == suffix)
    }

    pub fn is_convolution(self) -> bool {
        matches!(
            self,
            LayerKind::Conv1D | LayerKind::Conv2D | LayerKind::Conv3D
        )
    }

    pub fn is_configuration(self) -> bool {
        self == LayerKind::Configuration
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// An attribute kind: one slot of one layer's schema.
///
/// Only pairs declared by the layer's schema can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeKind {
    layer: LayerKind,
    definition: &'static AttributeDef,
}

impl AttributeKind {
    pub fn new(layer: LayerKind, slot: AttributeSlot) -> Option<Self> {
        schema::schema(layer)
            .get(slot)
            .map(|definition| Self { layer, definition })
    }

    pub fn layer(self) -> LayerKind {
        self.layer
    }

    pub fn slot(self) -> AttributeSlot {
        self.definition.slot()
    }

    /// The schema entry backing this kind.
    pub fn definition(self) -> &'static AttributeDef {
        self.definition
    }

    /// Type tag, e.g. `KernelDimAttributeConv2D`.
    pub fn type_tag(self) -> String {
        format!("{}Attribute{}", self.slot().type_stem(), self.layer.suffix())
    }

    pub fn from_type_tag(tag: &str) -> Option<Self> {
        let (stem, suffix) = tag.split_once("Attribute")?;
        let slot = AttributeSlot::from_type_stem(stem)?;
        let layer = LayerKind::from_suffix(suffix)?;
        Self::new(layer, slot)
    }
}

/// Generic classifier members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Attribute,
    Method,
}

/// Palette decorations with no diagram semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Title,
    Separator,
}

/// Discriminant of an [`Element`](super::Element).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Layer(LayerKind),
    Attribute(AttributeKind),
    Member(MemberKind),
    Container,
    Reference,
    Section(SectionKind),
}

impl ElementKind {
    pub fn type_tag(self) -> Cow<'static, str> {
        match self {
            ElementKind::Layer(layer) => layer.type_tag(),
            ElementKind::Attribute(attribute) => Cow::Owned(attribute.type_tag()),
            ElementKind::Member(MemberKind::Attribute) => Cow::Borrowed("ClassAttribute"),
            ElementKind::Member(MemberKind::Method) => Cow::Borrowed("ClassMethod"),
            ElementKind::Container => Cow::Borrowed("NNContainer"),
            ElementKind::Reference => Cow::Borrowed("NNReference"),
            ElementKind::Section(SectionKind::Title) => Cow::Borrowed("NNSectionTitle"),
            ElementKind::Section(SectionKind::Separator) => Cow::Borrowed("NNSectionSeparator"),
        }
    }

    pub fn from_type_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "ClassAttribute" => ElementKind::Member(MemberKind::Attribute),
            "ClassMethod" => ElementKind::Member(MemberKind::Method),
            "NNContainer" => ElementKind::Container,
            "NNReference" => ElementKind::Reference,
            "NNSectionTitle" => ElementKind::Section(SectionKind::Title),
            "NNSectionSeparator" => ElementKind::Section(SectionKind::Separator),
            _ => {
                return LayerKind::from_type_tag(tag)
                    .map(ElementKind::Layer)
                    .or_else(|| AttributeKind::from_type_tag(tag).map(ElementKind::Attribute));
            }
        };
        Some(kind)
    }

    /// Every element kind, layers first, then each layer's attributes in schema order.
    pub fn all() -> Vec<ElementKind> {
        let mut kinds: Vec<ElementKind> = LayerKind::ALL.into_iter().map(ElementKind::Layer).collect();
        for layer in LayerKind::ALL {
            kinds.extend(
                schema::schema(layer)
                    .attributes()
                    .iter()
                    .filter_map(|def| AttributeKind::new(layer, def.slot()))
                    .map(ElementKind::Attribute),
            );
        }
        kinds.extend([
            ElementKind::Member(MemberKind::Attribute),
            ElementKind::Member(MemberKind::Method),
            ElementKind::Container,
            ElementKind::Reference,
            ElementKind::Section(SectionKind::Title),
            ElementKind::Section(SectionKind::Separator),
        ]);
        kinds
    }

    /// Composite kinds keep an owned-elements list.
    pub fn is_composite(self) -> bool {
        matches!(self, ElementKind::Layer(_) | ElementKind::Container)
    }

    pub fn layer(self) -> Option<LayerKind> {
        match self {
            ElementKind::Layer(layer) => Some(layer),
            _ => None,
        }
    }

    /// Relationship kinds this element may take part in.
    pub fn supported_relationships(self) -> &'static [RelationshipKind] {
        use RelationshipKind as R;
        match self {
            ElementKind::Layer(LayerKind::Configuration) | ElementKind::Container => &[
                R::NNComposition,
                R::ClassBidirectional,
                R::ClassUnidirectional,
                R::ClassInheritance,
                R::ClassRealization,
                R::ClassDependency,
                R::ClassAggregation,
                R::ClassComposition,
                R::ClassOCLLink,
                R::ClassLinkRel,
            ],
            ElementKind::Layer(_) => &[
                R::NNNext,
                R::ClassBidirectional,
                R::ClassUnidirectional,
                R::ClassInheritance,
                R::ClassRealization,
                R::ClassDependency,
                R::ClassAggregation,
                R::ClassComposition,
                R::ClassOCLLink,
                R::ClassLinkRel,
            ],
            ElementKind::Reference => &[R::NNNext],
            ElementKind::Attribute(_) | ElementKind::Member(_) | ElementKind::Section(_) => &[],
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_tag())
    }
}

/// Discriminant of a [`Relationship`](super::Relationship).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    ClassBidirectional,
    ClassUnidirectional,
    ClassInheritance,
    ClassRealization,
    ClassDependency,
    ClassAggregation,
    ClassComposition,
    ClassOCLLink,
    ClassLinkRel,
    NNNext,
    NNComposition,
}

impl RelationshipKind {
    pub const ALL: [RelationshipKind; 11] = [
        RelationshipKind::ClassBidirectional,
        RelationshipKind::ClassUnidirectional,
        RelationshipKind::ClassInheritance,
        RelationshipKind::ClassRealization,
        RelationshipKind::ClassDependency,
        RelationshipKind::ClassAggregation,
        RelationshipKind::ClassComposition,
        RelationshipKind::ClassOCLLink,
        RelationshipKind::ClassLinkRel,
        RelationshipKind::NNNext,
        RelationshipKind::NNComposition,
    ];

    pub fn type_tag(self) -> &'static str {
        match self {
            RelationshipKind::ClassBidirectional => "ClassBidirectional",
            RelationshipKind::ClassUnidirectional => "ClassUnidirectional",
            RelationshipKind::ClassInheritance => "ClassInheritance",
            RelationshipKind::ClassRealization => "ClassRealization",
            RelationshipKind::ClassDependency => "ClassDependency",
            RelationshipKind::ClassAggregation => "ClassAggregation",
            RelationshipKind::ClassComposition => "ClassComposition",
            RelationshipKind::ClassOCLLink => "ClassOCLLink",
            RelationshipKind::ClassLinkRel => "ClassLinkRel",
            RelationshipKind::NNNext => "NNNext",
            RelationshipKind::NNComposition => "NNComposition",
        }
    }

    pub fn from_type_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_tag() == tag)
    }

    /// Name given to a freshly constructed relationship of this kind.
    pub fn default_name(self) -> &'static str {
        match self {
            RelationshipKind::NNNext => "next",
            _ => "",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_tag())
    }
}
