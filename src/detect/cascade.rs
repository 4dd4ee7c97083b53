//! Loader for OpenCV boosted Haar cascade definitions.
//!
//! Reads the XML layout written by `opencv_traincascade` (the format of the
//! stock `haarcascade_frontalface_default.xml`):
//!
//! ```text
//! <opencv_storage>
//!   <cascade>
//!     <stageType>BOOST</stageType>
//!     <featureType>HAAR</featureType>
//!     <height>24</height> <width>24</width>
//!     <stages>
//!       <_>
//!         <stageThreshold>-5.04</stageThreshold>
//!         <weakClassifiers>
//!           <_>
//!             <internalNodes>0 -1 0 -3.15e-02</internalNodes>   left right feature threshold
//!             <leafValues>2.08 -2.21</leafValues>
//!           </_>
//!         </weakClassifiers>
//!       </_>
//!     </stages>
//!     <features>
//!       <_> <rects> <_>6 4 12 9 -1.</_> <_>6 7 12 3 3.</_> </rects> </_>
//!     </features>
//!   </cascade>
//! </opencv_storage>
//! ```
//!
//! Node links `<= 0` point into the leaf table (`-link`), positive links point
//! to another internal node of the same tree.

use roxmltree::{Document, Node as XmlNode};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("Cannot read classifier {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed classifier XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("Invalid cascade definition: {0}")]
    Format(String),
    #[error("Unsupported cascade: {0}")]
    Unsupported(String),
}

type Result<T> = std::result::Result<T, CascadeError>;

/// A weighted rectangle inside the detection window.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WeightedRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub weight: f64,
}

/// Haar-like feature: weighted sum of up to three rectangles.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Feature {
    pub rects: Vec<WeightedRect>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TreeNode {
    pub left: i32,
    pub right: i32,
    pub feature: usize,
    pub threshold: f64,
}

/// Decision tree over features; stumps have a single node and two leaves.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WeakClassifier {
    pub nodes: Vec<TreeNode>,
    pub leaves: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Stage {
    pub threshold: f64,
    pub classifiers: Vec<WeakClassifier>,
}

/// A parsed, validated boosted Haar cascade.
#[derive(Debug, Clone)]
pub struct HaarCascade {
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    pub(crate) stages: Vec<Stage>,
    pub(crate) features: Vec<Feature>,
}

impl HaarCascade {
    /// Read and parse a cascade file.
    pub fn load(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path).map_err(|source| CascadeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&xml)
    }

    /// Parse a cascade from XML text.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)?;

        let Some(cascade) = doc.descendants().find(|n| n.has_tag_name("cascade")) else {
            let legacy = doc
                .descendants()
                .any(|n| n.attribute("type_id") == Some("opencv-haar-classifier"));
            return Err(if legacy {
                CascadeError::Unsupported("legacy opencv-haar-classifier layout".into())
            } else {
                CascadeError::Format("missing <cascade> element".into())
            });
        };

        let stage_type = child_text(cascade, "stageType")?;
        if stage_type != "BOOST" {
            return Err(CascadeError::Unsupported(format!(
                "stage type {stage_type}"
            )));
        }
        let feature_type = child_text(cascade, "featureType")?;
        if feature_type != "HAAR" {
            return Err(CascadeError::Unsupported(format!(
                "feature type {feature_type}"
            )));
        }

        let window_width: u32 = parse_scalar(child_text(cascade, "width")?, "width")?;
        let window_height: u32 = parse_scalar(child_text(cascade, "height")?, "height")?;
        if window_width < 3 || window_height < 3 {
            return Err(CascadeError::Format(format!(
                "window {window_width}x{window_height} is too small"
            )));
        }

        let stages = items(child(cascade, "stages")?)
            .map(parse_stage)
            .collect::<Result<Vec<_>>>()?;
        let features = items(child(cascade, "features")?)
            .map(parse_feature)
            .collect::<Result<Vec<_>>>()?;

        if let Some(declared) = optional_child(cascade, "stageNum") {
            let declared: usize = parse_scalar(node_text(declared), "stageNum")?;
            if declared != stages.len() {
                return Err(CascadeError::Format(format!(
                    "stageNum is {declared} but {} stages are defined",
                    stages.len()
                )));
            }
        }

        let cascade = Self {
            window_width,
            window_height,
            stages,
            features,
        };
        cascade.validate()?;
        Ok(cascade)
    }

    /// Detection window size the cascade was trained on.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Check every cross reference so evaluation can index without bounds
    /// failures.
    fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            return Err(CascadeError::Format("cascade has no stages".into()));
        }

        for (f_idx, feature) in self.features.iter().enumerate() {
            for r in &feature.rects {
                let fits = |start: u32, len: u32, limit: u32| {
                    start.checked_add(len).is_some_and(|end| end <= limit)
                };
                if !fits(r.x, r.width, self.window_width) || !fits(r.y, r.height, self.window_height)
                {
                    return Err(CascadeError::Format(format!(
                        "feature {f_idx} rectangle exceeds the {}x{} window",
                        self.window_width, self.window_height
                    )));
                }
            }
        }

        for (s_idx, stage) in self.stages.iter().enumerate() {
            for classifier in &stage.classifiers {
                for (n_idx, node) in classifier.nodes.iter().enumerate() {
                    if node.feature >= self.features.len() {
                        return Err(CascadeError::Format(format!(
                            "stage {s_idx} references feature {} of {}",
                            node.feature,
                            self.features.len()
                        )));
                    }
                    for link in [node.left, node.right] {
                        let in_range = if link <= 0 {
                            (link.unsigned_abs() as usize) < classifier.leaves.len()
                        } else {
                            // Forward links only, so tree walks terminate.
                            (link as usize) > n_idx && (link as usize) < classifier.nodes.len()
                        };
                        if !in_range {
                            return Err(CascadeError::Format(format!(
                                "stage {s_idx} has a dangling tree link {link}"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn parse_stage(node: XmlNode) -> Result<Stage> {
    let threshold = parse_scalar(child_text(node, "stageThreshold")?, "stageThreshold")?;
    let classifiers = items(child(node, "weakClassifiers")?)
        .map(parse_weak_classifier)
        .collect::<Result<Vec<_>>>()?;
    if classifiers.is_empty() {
        return Err(CascadeError::Format("stage without weak classifiers".into()));
    }
    Ok(Stage {
        threshold,
        classifiers,
    })
}

fn parse_weak_classifier(node: XmlNode) -> Result<WeakClassifier> {
    let raw: Vec<&str> = child_text(node, "internalNodes")?
        .split_whitespace()
        .collect();
    if raw.is_empty() || raw.len() % 4 != 0 {
        return Err(CascadeError::Format(format!(
            "internalNodes must hold groups of 4 values, got {}",
            raw.len()
        )));
    }

    let nodes = raw
        .chunks(4)
        .map(|q| {
            let feature: i64 = parse_scalar(q[2], "feature index")?;
            Ok(TreeNode {
                left: parse_scalar(q[0], "left link")?,
                right: parse_scalar(q[1], "right link")?,
                feature: usize::try_from(feature).map_err(|_| {
                    CascadeError::Format(format!("negative feature index {feature}"))
                })?,
                threshold: parse_scalar(q[3], "node threshold")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let leaves = parse_list::<f64>(child_text(node, "leafValues")?, "leafValues")?;
    if leaves.is_empty() {
        return Err(CascadeError::Format("weak classifier without leaves".into()));
    }

    Ok(WeakClassifier { nodes, leaves })
}

fn parse_feature(node: XmlNode) -> Result<Feature> {
    if let Some(tilted) = optional_child(node, "tilted") {
        if node_text(tilted) != "0" {
            return Err(CascadeError::Unsupported("tilted Haar features".into()));
        }
    }

    let rects = items(child(node, "rects")?)
        .map(|r| {
            let values = parse_list::<f64>(node_text(r), "feature rect")?;
            let &[x, y, w, h, weight] = values.as_slice() else {
                return Err(CascadeError::Format(format!(
                    "feature rect needs 5 values, got {}",
                    values.len()
                )));
            };
            let [Some(x), Some(y), Some(width @ 1..), Some(height @ 1..)] =
                [x, y, w, h].map(rect_coord)
            else {
                return Err(CascadeError::Format(format!(
                    "invalid feature rect {x} {y} {w} {h}"
                )));
            };
            Ok(WeightedRect {
                x,
                y,
                width,
                height,
                weight,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if rects.is_empty() {
        return Err(CascadeError::Format("feature without rectangles".into()));
    }
    Ok(Feature { rects })
}

/// A non-negative whole number that fits in `u32`.
fn rect_coord(value: f64) -> Option<u32> {
    let whole = value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value);
    whole.then_some(value as u32)
}

// ============================================================================
// XML helpers
// ============================================================================

/// Element children named `_`, the OpenCV sequence item tag.
fn items<'a, 'i>(node: XmlNode<'a, 'i>) -> impl Iterator<Item = XmlNode<'a, 'i>> {
    node.children().filter(|n| n.has_tag_name("_"))
}

fn optional_child<'a, 'i>(node: XmlNode<'a, 'i>, name: &str) -> Option<XmlNode<'a, 'i>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn child<'a, 'i>(node: XmlNode<'a, 'i>, name: &str) -> Result<XmlNode<'a, 'i>> {
    optional_child(node, name)
        .ok_or_else(|| CascadeError::Format(format!("missing <{name}> element")))
}

fn node_text<'a>(node: XmlNode<'a, '_>) -> &'a str {
    node.text().map(str::trim).unwrap_or("")
}

fn child_text<'a>(node: XmlNode<'a, '_>, name: &str) -> Result<&'a str> {
    child(node, name).map(node_text)
}

fn parse_scalar<T: FromStr>(text: &str, what: &str) -> Result<T> {
    text.trim()
        .parse()
        .map_err(|_| CascadeError::Format(format!("invalid {what}: {text:?}")))
}

fn parse_list<T: FromStr>(text: &str, what: &str) -> Result<Vec<T>> {
    text.split_whitespace()
        .map(|t| parse_scalar(t, what))
        .collect()
}
