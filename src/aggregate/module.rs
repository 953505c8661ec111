//! Metadata handed to the report renderer alongside the views.

use serde::Deserialize;
use serde::Serialize;

/// Path of the stylesheet bundled with the report, used unmodified.
pub const CSS_ASSET: &str = "assets/css/multiqc_fastqc.css";

/// Path of the script bundled with the report, used unmodified.
pub const JS_ASSET: &str = "assets/js/multiqc_fastqc.js";

/// Describes the report section produced from DRAGEN metrics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Display name.
    pub name: String,

    /// HTML anchor of the section.
    pub anchor: String,

    /// Target the section links to.
    pub target: String,

    /// Link to the tool's homepage.
    pub href: String,

    /// One line description, displayed after the name.
    pub info: String,
}

impl Default for ModuleDescriptor {
    fn default() -> Self {
        Self {
            name: String::from("DRAGEN"),
            anchor: String::from("DRAGEN"),
            target: String::from("DRAGEN"),
            href: String::from(
                "https://www.illumina.com/products/by-type/informatics-products/dragen-bio-it-platform.html",
            ),
            info: String::from(
                " is a Bio-IT Platform that provides ultra-rapid secondary analysis of sequencing \
                 data using field-programmable gate array technology (FPGA).",
            ),
        }
    }
}

/// Asset bundles the renderer must ship with the section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
    /// Stylesheets.
    pub css: Vec<String>,

    /// Scripts.
    pub js: Vec<String>,
}

impl Default for Assets {
    fn default() -> Self {
        Self {
            css: vec![CSS_ASSET.to_string()],
            js: vec![JS_ASSET.to_string()],
        }
    }
}
