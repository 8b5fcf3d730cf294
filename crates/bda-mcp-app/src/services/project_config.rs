//! Serializable mirrors of a project's output, override and library settings.
//!
//! Field names follow the service's camelCase wire shape, so a project
//! rendered from these types reads like the upstream `GetDataAutomationProject`
//! response. Enum members render as their wire strings.

use aws_sdk_bedrockdataautomation::types::{
    AudioExtractionCategory, AudioLanguageConfiguration, AudioOverrideConfiguration,
    AudioStandardOutputConfiguration, BlueprintItem, CustomOutputConfiguration,
    DataAutomationLibraryConfiguration, DocumentOverrideConfiguration,
    DocumentStandardOutputConfiguration, ImageOverrideConfiguration,
    ImageStandardOutputConfiguration, ModalityProcessingConfiguration,
    ModalityRoutingConfiguration, OverrideConfiguration, SensitiveDataConfiguration,
    StandardOutputConfiguration, State, VideoOverrideConfiguration,
    VideoStandardOutputConfiguration,
};
use serde::Serialize;

fn name<T: AsRef<str>>(value: &T) -> String {
    value.as_ref().to_string()
}

fn names<T: AsRef<str>>(values: &[T]) -> Vec<String> {
    values.iter().map(name).collect()
}

/// `{"state": "ENABLED"}` style switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toggle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl Toggle {
    fn of(state: &State) -> Self {
        Self {
            state: Some(name(state)),
        }
    }

    fn maybe(state: Option<&State>) -> Self {
        Self {
            state: state.map(name),
        }
    }
}

/// A switch with the member types it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedToggle {
    pub state: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

impl TypedToggle {
    fn new<T: AsRef<str>>(state: &State, types: &[T]) -> Self {
        Self {
            state: name(state),
            types: names(types),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeList {
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentStandardOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaStandardOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<MediaStandardOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioStandardOutput>,
}

impl From<&StandardOutputConfiguration> for StandardOutput {
    fn from(config: &StandardOutputConfiguration) -> Self {
        Self {
            document: config.document().map(DocumentStandardOutput::from),
            image: config.image().map(MediaStandardOutput::from),
            video: config.video().map(MediaStandardOutput::from),
            audio: config.audio().map(AudioStandardOutput::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStandardOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<DocumentExtraction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generative_field: Option<Toggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<DocumentOutputFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentExtraction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granularity: Option<TypeList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<Toggle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOutputFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_format: Option<TypeList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_file_format: Option<Toggle>,
}

impl From<&DocumentStandardOutputConfiguration> for DocumentStandardOutput {
    fn from(config: &DocumentStandardOutputConfiguration) -> Self {
        Self {
            extraction: config.extraction().map(|extraction| DocumentExtraction {
                granularity: extraction.granularity().map(|granularity| TypeList {
                    types: names(granularity.types()),
                }),
                bounding_box: extraction.bounding_box().map(|bbox| Toggle::of(bbox.state())),
            }),
            generative_field: config
                .generative_field()
                .map(|field| Toggle::of(field.state())),
            output_format: config.output_format().map(|format| DocumentOutputFormat {
                text_format: format.text_format().map(|text| TypeList {
                    types: names(text.types()),
                }),
                additional_file_format: format
                    .additional_file_format()
                    .map(|extra| Toggle::of(extra.state())),
            }),
        }
    }
}

/// Image and video standard output share one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStandardOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<MediaExtraction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generative_field: Option<TypedToggle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaExtraction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TypedToggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<Toggle>,
}

impl From<&ImageStandardOutputConfiguration> for MediaStandardOutput {
    fn from(config: &ImageStandardOutputConfiguration) -> Self {
        Self {
            extraction: config.extraction().map(|extraction| MediaExtraction {
                category: extraction
                    .category()
                    .map(|category| TypedToggle::new(category.state(), category.types())),
                bounding_box: extraction.bounding_box().map(|bbox| Toggle::of(bbox.state())),
            }),
            generative_field: config
                .generative_field()
                .map(|field| TypedToggle::new(field.state(), field.types())),
        }
    }
}

impl From<&VideoStandardOutputConfiguration> for MediaStandardOutput {
    fn from(config: &VideoStandardOutputConfiguration) -> Self {
        Self {
            extraction: config.extraction().map(|extraction| MediaExtraction {
                category: extraction
                    .category()
                    .map(|category| TypedToggle::new(category.state(), category.types())),
                bounding_box: extraction.bounding_box().map(|bbox| Toggle::of(bbox.state())),
            }),
            generative_field: config
                .generative_field()
                .map(|field| TypedToggle::new(field.state(), field.types())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioStandardOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<AudioExtraction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generative_field: Option<TypedToggle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioExtraction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<AudioCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioCategory {
    pub state: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_configuration: Option<AudioTypeConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioTypeConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<TranscriptSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_labeling: Option<Toggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_labeling: Option<Toggle>,
}

impl From<&AudioExtractionCategory> for AudioCategory {
    fn from(category: &AudioExtractionCategory) -> Self {
        Self {
            state: name(category.state()),
            types: names(category.types()),
            type_configuration: category.type_configuration().map(|config| {
                AudioTypeConfiguration {
                    transcript: config.transcript().map(|transcript| TranscriptSettings {
                        speaker_labeling: transcript
                            .speaker_labeling()
                            .map(|labeling| Toggle::of(labeling.state())),
                        channel_labeling: transcript
                            .channel_labeling()
                            .map(|labeling| Toggle::of(labeling.state())),
                    }),
                }
            }),
        }
    }
}

impl From<&AudioStandardOutputConfiguration> for AudioStandardOutput {
    fn from(config: &AudioStandardOutputConfiguration) -> Self {
        Self {
            extraction: config.extraction().map(|extraction| AudioExtraction {
                category: extraction.category().map(AudioCategory::from),
            }),
            generative_field: config
                .generative_field()
                .map(|field| TypedToggle::new(field.state(), field.types())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub blueprint_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blueprint_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blueprint_stage: Option<String>,
}

impl From<&BlueprintItem> for Blueprint {
    fn from(item: &BlueprintItem) -> Self {
        Self {
            blueprint_arn: item.blueprint_arn().to_string(),
            blueprint_version: item.blueprint_version().map(str::to_string),
            blueprint_stage: item.blueprint_stage().map(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomOutput {
    pub blueprints: Vec<Blueprint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentCustomOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCustomOutput {
    pub fallback_blueprints: Vec<Blueprint>,
}

impl From<&CustomOutputConfiguration> for CustomOutput {
    fn from(config: &CustomOutputConfiguration) -> Self {
        Self {
            blueprints: config.blueprints().iter().map(Blueprint::from).collect(),
            document: config.document().map(|document| DocumentCustomOutput {
                fallback_blueprints: document
                    .fallback_blueprints()
                    .iter()
                    .map(Blueprint::from)
                    .collect(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<MediaOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality_routing: Option<ModalityRouting>,
}

impl From<&OverrideConfiguration> for Overrides {
    fn from(config: &OverrideConfiguration) -> Self {
        Self {
            document: config.document().map(DocumentOverrides::from),
            image: config.image().map(MediaOverrides::from),
            video: config.video().map(MediaOverrides::from),
            audio: config.audio().map(AudioOverrides::from),
            modality_routing: config.modality_routing().map(ModalityRouting::from),
        }
    }
}

fn processing(config: Option<&ModalityProcessingConfiguration>) -> Option<Toggle> {
    config.map(|config| Toggle::maybe(config.state()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splitter: Option<Toggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality_processing: Option<Toggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitive_data_configuration: Option<SensitiveData>,
}

impl From<&DocumentOverrideConfiguration> for DocumentOverrides {
    fn from(config: &DocumentOverrideConfiguration) -> Self {
        Self {
            splitter: config
                .splitter()
                .map(|splitter| Toggle::maybe(splitter.state())),
            modality_processing: processing(config.modality_processing()),
            sensitive_data_configuration: config
                .sensitive_data_configuration()
                .map(SensitiveData::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality_processing: Option<Toggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitive_data_configuration: Option<SensitiveData>,
}

impl From<&ImageOverrideConfiguration> for MediaOverrides {
    fn from(config: &ImageOverrideConfiguration) -> Self {
        Self {
            modality_processing: processing(config.modality_processing()),
            sensitive_data_configuration: config
                .sensitive_data_configuration()
                .map(SensitiveData::from),
        }
    }
}

impl From<&VideoOverrideConfiguration> for MediaOverrides {
    fn from(config: &VideoOverrideConfiguration) -> Self {
        Self {
            modality_processing: processing(config.modality_processing()),
            sensitive_data_configuration: config
                .sensitive_data_configuration()
                .map(SensitiveData::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality_processing: Option<Toggle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_configuration: Option<AudioLanguage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitive_data_configuration: Option<SensitiveData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioLanguage {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub input_languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generative_output_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identify_multiple_languages: Option<bool>,
}

impl From<&AudioLanguageConfiguration> for AudioLanguage {
    fn from(config: &AudioLanguageConfiguration) -> Self {
        Self {
            input_languages: names(config.input_languages()),
            generative_output_language: config.generative_output_language().map(name),
            identify_multiple_languages: config.identify_multiple_languages(),
        }
    }
}

impl From<&AudioOverrideConfiguration> for AudioOverrides {
    fn from(config: &AudioOverrideConfiguration) -> Self {
        Self {
            modality_processing: processing(config.modality_processing()),
            language_configuration: config.language_configuration().map(AudioLanguage::from),
            sensitive_data_configuration: config
                .sensitive_data_configuration()
                .map(SensitiveData::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitiveData {
    pub detection_mode: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub detection_scope: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pii_entities_configuration: Option<PiiEntities>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PiiEntities {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pii_entity_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redaction_mask_mode: Option<String>,
}

impl From<&SensitiveDataConfiguration> for SensitiveData {
    fn from(config: &SensitiveDataConfiguration) -> Self {
        Self {
            detection_mode: name(config.detection_mode()),
            detection_scope: names(config.detection_scope()),
            pii_entities_configuration: config.pii_entities_configuration().map(|pii| {
                PiiEntities {
                    pii_entity_types: names(pii.pii_entity_types()),
                    redaction_mask_mode: pii.redaction_mask_mode().map(name),
                }
            }),
        }
    }
}

/// Modality each routed file type is processed as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModalityRouting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jpeg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub png: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mp4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mov: Option<String>,
}

impl From<&ModalityRoutingConfiguration> for ModalityRouting {
    fn from(config: &ModalityRoutingConfiguration) -> Self {
        Self {
            jpeg: config.jpeg().map(name),
            png: config.png().map(name),
            mp4: config.mp4().map(name),
            mov: config.mov().map(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Libraries {
    pub libraries: Vec<LibraryRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryRef {
    pub library_arn: String,
}

impl From<&DataAutomationLibraryConfiguration> for Libraries {
    fn from(config: &DataAutomationLibraryConfiguration) -> Self {
        Self {
            libraries: config
                .libraries()
                .iter()
                .map(|library| LibraryRef {
                    library_arn: library.library_arn().to_string(),
                })
                .collect(),
        }
    }
}
