//! Declarative attribute schemas for every layer kind.
//!
//! Each layer kind owns a fixed table of [`AttributeDef`]s. The tables drive
//! attribute construction, mandatory scaffolding, optional toggles and the
//! enumerated option sets offered for a value.

use serde::{Deserialize, Serialize};

use super::kind::LayerKind;

/// Semantic kind of an attribute value, used for display and validation hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[serde(rename = "int")]
    Integer,
    Float,
    #[serde(rename = "bool")]
    Boolean,
    List,
    Enum,
    Text,
}

pub const PADDING_TYPES: &[&str] = &["valid", "same"];
pub const TENSOR_OPERATIONS: &[&str] = &[
    "reshape",
    "concatenate",
    "multiply",
    "matmultiply",
    "transpose",
    "permute",
];
pub const RETURN_TYPES: &[&str] = &["hidden", "last", "full"];
pub const ACTIVATION_FUNCTIONS: &[&str] = &["relu", "leaky_relu", "sigmoid", "softmax", "tanh"];
pub const BOOLEANS: &[&str] = &["true", "false"];
pub const POOLING_TYPES: &[&str] = &[
    "average",
    "max",
    "adaptive_average",
    "adaptive_max",
    "global_average",
    "global_max",
];
pub const DIMENSIONS: &[&str] = &["1D", "2D", "3D"];
pub const OPTIMIZERS: &[&str] = &["sgd", "adam", "adamW", "adagrad"];
pub const LOSS_FUNCTIONS: &[&str] = &["crossentropy", "binary_crossentropy", "mse"];
pub const METRICS: &[&str] = &["accuracy", "precision", "recall", "f1-score", "mae"];

macro_rules! slots {
    ($($variant:ident => $name:literal, $kind:ident;)*) => {
        /// A named attribute position within a layer schema.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum AttributeSlot {
            $($variant,)*
        }

        impl AttributeSlot {
            pub const ALL: &'static [AttributeSlot] = &[$(AttributeSlot::$variant,)*];

            /// Returns the symbolic attribute name, e.g. `kernel_dim`.
            pub fn attribute_name(self) -> &'static str {
                match self {
                    $(AttributeSlot::$variant => $name,)*
                }
            }

            /// Returns the PascalCase stem used in attribute type tags, e.g. `KernelDim`.
            pub fn type_stem(self) -> &'static str {
                match self {
                    $(AttributeSlot::$variant => stringify!($variant),)*
                }
            }

            pub fn value_kind(self) -> ValueKind {
                match self {
                    $(AttributeSlot::$variant => ValueKind::$kind,)*
                }
            }
        }
    };
}

slots! {
    Name => "name", Text;
    KernelDim => "kernel_dim", List;
    OutChannels => "out_channels", Integer;
    StrideDim => "stride_dim", List;
    InChannels => "in_channels", Integer;
    PaddingAmount => "padding_amount", Integer;
    PaddingType => "padding_type", Enum;
    ActvFunc => "actv_func", Enum;
    NameModuleInput => "name_module_input", Text;
    InputReused => "input_reused", Boolean;
    PermuteIn => "permute_in", Boolean;
    PermuteOut => "permute_out", Boolean;
    PoolingType => "pooling_type", Enum;
    Dimension => "dimension", Enum;
    OutputDim => "output_dim", Integer;
    HiddenSize => "hidden_size", Integer;
    ReturnType => "return_type", Enum;
    InputSize => "input_size", Integer;
    Bidirectional => "bidirectional", Boolean;
    Dropout => "dropout", Float;
    BatchFirst => "batch_first", Boolean;
    OutFeatures => "out_features", Integer;
    InFeatures => "in_features", Integer;
    StartDim => "start_dim", Integer;
    EndDim => "end_dim", Integer;
    NumEmbeddings => "num_embeddings", Integer;
    EmbeddingDim => "embedding_dim", Integer;
    Rate => "rate", Float;
    NormalizedShape => "normalized_shape", List;
    NumFeatures => "num_features", Integer;
    TnsType => "tns_type", Enum;
    ConcatenateDim => "concatenate_dim", Integer;
    LayersOfTensors => "layers_of_tensors", List;
    ReshapeDim => "reshape_dim", List;
    TransposeDim => "transpose_dim", List;
    PermuteDim => "permute_dim", List;
    BatchSize => "batch_size", Integer;
    Epochs => "epochs", Integer;
    LearningRate => "learning_rate", Float;
    Optimizer => "optimizer", Enum;
    LossFunction => "loss_function", Enum;
    Metrics => "metrics", List;
    WeightDecay => "weight_decay", Float;
    Momentum => "momentum", Float;
}

impl AttributeSlot {
    pub fn from_attribute_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|slot| slot.attribute_name() == name)
    }

    pub fn from_type_stem(stem: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|slot| slot.type_stem() == stem)
    }

    /// Returns the enumerated values a slot may take, if it is a choice.
    pub fn options(self) -> Option<&'static [&'static str]> {
        match self {
            AttributeSlot::PaddingType => Some(PADDING_TYPES),
            AttributeSlot::ActvFunc => Some(ACTIVATION_FUNCTIONS),
            AttributeSlot::InputReused
            | AttributeSlot::PermuteIn
            | AttributeSlot::PermuteOut
            | AttributeSlot::Bidirectional
            | AttributeSlot::BatchFirst => Some(BOOLEANS),
            AttributeSlot::PoolingType => Some(POOLING_TYPES),
            AttributeSlot::Dimension => Some(DIMENSIONS),
            AttributeSlot::ReturnType => Some(RETURN_TYPES),
            AttributeSlot::TnsType => Some(TENSOR_OPERATIONS),
            AttributeSlot::Optimizer => Some(OPTIMIZERS),
            AttributeSlot::LossFunction => Some(LOSS_FUNCTIONS),
            AttributeSlot::Metrics => Some(METRICS),
            _ => None,
        }
    }

    /// Multi-select slots store a bracketed list of chosen options.
    pub fn is_multi_select(self) -> bool {
        matches!(self, AttributeSlot::Metrics)
    }

    /// Slots whose value is chosen from predecessor node names rather than typed.
    pub fn is_selection_driven(self) -> bool {
        matches!(
            self,
            AttributeSlot::NameModuleInput | AttributeSlot::LayersOfTensors
        )
    }
}

/// One entry of a layer schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeDef {
    slot: AttributeSlot,
    default: &'static str,
    mandatory: bool,
}

impl AttributeDef {
    const fn mandatory(slot: AttributeSlot, default: &'static str) -> Self {
        Self {
            slot,
            default,
            mandatory: true,
        }
    }

    const fn optional(slot: AttributeSlot, default: &'static str) -> Self {
        Self {
            slot,
            default,
            mandatory: false,
        }
    }

    pub fn slot(&self) -> AttributeSlot {
        self.slot
    }

    pub fn default_value(&self) -> &'static str {
        self.default
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn value_kind(&self) -> ValueKind {
        self.slot.value_kind()
    }
}

/// The ordered attribute table of one layer kind.
#[derive(Debug)]
pub struct LayerSchema {
    layer: LayerKind,
    attributes: &'static [AttributeDef],
}

impl LayerSchema {
    pub fn layer(&self) -> LayerKind {
        self.layer
    }

    pub fn attributes(&self) -> &'static [AttributeDef] {
        self.attributes
    }

    pub fn mandatory(&self) -> impl Iterator<Item = &'static AttributeDef> {
        self.attributes.iter().filter(|def| def.mandatory)
    }

    pub fn optional(&self) -> impl Iterator<Item = &'static AttributeDef> {
        self.attributes.iter().filter(|def| !def.mandatory)
    }

    pub fn get(&self, slot: AttributeSlot) -> Option<&'static AttributeDef> {
        self.attributes.iter().find(|def| def.slot == slot)
    }
}

use AttributeSlot as S;

const fn m(slot: AttributeSlot, default: &'static str) -> AttributeDef {
    AttributeDef::mandatory(slot, default)
}

const fn o(slot: AttributeSlot, default: &'static str) -> AttributeDef {
    AttributeDef::optional(slot, default)
}

macro_rules! conv_schema {
    ($name:literal, $kernel:literal, $stride:literal) => {
        &[
            m(S::Name, $name),
            m(S::KernelDim, $kernel),
            m(S::OutChannels, "16"),
            o(S::StrideDim, $stride),
            o(S::InChannels, "3"),
            o(S::PaddingAmount, "0"),
            o(S::PaddingType, "valid"),
            o(S::ActvFunc, "relu"),
            o(S::NameModuleInput, ""),
            o(S::InputReused, "false"),
            o(S::PermuteIn, "false"),
            o(S::PermuteOut, "false"),
        ]
    };
}

macro_rules! recurrent_schema {
    ($name:literal) => {
        &[
            m(S::Name, $name),
            m(S::HiddenSize, "128"),
            o(S::ReturnType, "full"),
            o(S::InputSize, "64"),
            o(S::Bidirectional, "false"),
            o(S::Dropout, "0.0"),
            o(S::BatchFirst, "true"),
            o(S::ActvFunc, "tanh"),
            o(S::NameModuleInput, ""),
            o(S::InputReused, "false"),
        ]
    };
}

static CONV1D: LayerSchema = LayerSchema {
    layer: LayerKind::Conv1D,
    attributes: conv_schema!("conv1d_layer", "[3]", "[1]"),
};

static CONV2D: LayerSchema = LayerSchema {
    layer: LayerKind::Conv2D,
    attributes: conv_schema!("conv2d_layer", "[3, 3]", "[1, 1]"),
};

static CONV3D: LayerSchema = LayerSchema {
    layer: LayerKind::Conv3D,
    attributes: conv_schema!("conv3d_layer", "[3, 3, 3]", "[1, 1, 1]"),
};

static POOLING: LayerSchema = LayerSchema {
    layer: LayerKind::Pooling,
    attributes: &[
        m(S::Name, "Pooling_layer"),
        m(S::PoolingType, "max"),
        m(S::Dimension, "2D"),
        o(S::KernelDim, "[3, 3]"),
        o(S::StrideDim, "[1, 1]"),
        o(S::PaddingAmount, "0"),
        o(S::PaddingType, "valid"),
        o(S::OutputDim, "16"),
        o(S::ActvFunc, "relu"),
        o(S::NameModuleInput, ""),
        o(S::InputReused, "false"),
        o(S::PermuteIn, "false"),
        o(S::PermuteOut, "false"),
    ],
};

static RNN: LayerSchema = LayerSchema {
    layer: LayerKind::Rnn,
    attributes: recurrent_schema!("RNN_layer"),
};

static LSTM: LayerSchema = LayerSchema {
    layer: LayerKind::Lstm,
    attributes: recurrent_schema!("LSTM_layer"),
};

static GRU: LayerSchema = LayerSchema {
    layer: LayerKind::Gru,
    attributes: recurrent_schema!("GRU_layer"),
};

static LINEAR: LayerSchema = LayerSchema {
    layer: LayerKind::Linear,
    attributes: &[
        m(S::Name, "linear_layer"),
        m(S::OutFeatures, "128"),
        o(S::InFeatures, "64"),
        o(S::ActvFunc, "relu"),
        o(S::NameModuleInput, ""),
        o(S::InputReused, "false"),
    ],
};

static FLATTEN: LayerSchema = LayerSchema {
    layer: LayerKind::Flatten,
    attributes: &[
        m(S::Name, "Flatten_layer"),
        o(S::StartDim, "1"),
        o(S::EndDim, "-1"),
        o(S::ActvFunc, "relu"),
        o(S::NameModuleInput, ""),
        o(S::InputReused, "false"),
    ],
};

static EMBEDDING: LayerSchema = LayerSchema {
    layer: LayerKind::Embedding,
    attributes: &[
        m(S::Name, "Embedding_layer"),
        m(S::NumEmbeddings, "1000"),
        m(S::EmbeddingDim, "128"),
        o(S::ActvFunc, "relu"),
        o(S::NameModuleInput, ""),
        o(S::InputReused, "false"),
    ],
};

static DROPOUT: LayerSchema = LayerSchema {
    layer: LayerKind::Dropout,
    attributes: &[
        m(S::Name, "Dropout_layer"),
        m(S::Rate, "0.5"),
        o(S::NameModuleInput, ""),
        o(S::InputReused, "false"),
    ],
};

static LAYER_NORMALIZATION: LayerSchema = LayerSchema {
    layer: LayerKind::LayerNormalization,
    attributes: &[
        m(S::Name, "LayerNorm_layer"),
        m(S::NormalizedShape, "[-1]"),
        o(S::ActvFunc, "relu"),
        o(S::NameModuleInput, ""),
        o(S::InputReused, "false"),
    ],
};

static BATCH_NORMALIZATION: LayerSchema = LayerSchema {
    layer: LayerKind::BatchNormalization,
    attributes: &[
        m(S::Name, "BatchNorm_layer"),
        m(S::NumFeatures, "128"),
        m(S::Dimension, "2D"),
        o(S::ActvFunc, "relu"),
        o(S::NameModuleInput, ""),
        o(S::InputReused, "false"),
    ],
};

static TENSOR_OP: LayerSchema = LayerSchema {
    layer: LayerKind::TensorOp,
    attributes: &[
        m(S::Name, "TensorOp_layer"),
        m(S::TnsType, "reshape"),
        o(S::ConcatenateDim, "0"),
        o(S::LayersOfTensors, "[]"),
        o(S::ReshapeDim, "[-1]"),
        o(S::TransposeDim, "[0, 1]"),
        o(S::PermuteDim, "[0, 1, 2]"),
        o(S::InputReused, "false"),
    ],
};

static CONFIGURATION: LayerSchema = LayerSchema {
    layer: LayerKind::Configuration,
    attributes: &[
        m(S::BatchSize, "32"),
        m(S::Epochs, "10"),
        m(S::LearningRate, "0.001"),
        m(S::Optimizer, "adam"),
        m(S::LossFunction, "crossentropy"),
        m(S::Metrics, "[accuracy]"),
        o(S::WeightDecay, "0.0"),
        o(S::Momentum, "0"),
    ],
};

/// Returns the attribute schema of `layer`.
pub fn schema(layer: LayerKind) -> &'static LayerSchema {
    match layer {
        LayerKind::Conv1D => &CONV1D,
        LayerKind::Conv2D => &CONV2D,
        LayerKind::Conv3D => &CONV3D,
        LayerKind::Pooling => &POOLING,
        LayerKind::Rnn => &RNN,
        LayerKind::Lstm => &LSTM,
        LayerKind::Gru => &GRU,
        LayerKind::Linear => &LINEAR,
        LayerKind::Flatten => &FLATTEN,
        LayerKind::Embedding => &EMBEDDING,
        LayerKind::Dropout => &DROPOUT,
        LayerKind::LayerNormalization => &LAYER_NORMALIZATION,
        LayerKind::BatchNormalization => &BATCH_NORMALIZATION,
        LayerKind::TensorOp => &TENSOR_OP,
        LayerKind::Configuration => &CONFIGURATION,
    }
}
