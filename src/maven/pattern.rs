use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::maven::coordinates::{ArtifactDescriptor, ModuleCoordinate, ModuleSource};

/// The standard Maven2 repository layout. Metadata-based snapshot resolution is
///  only meaningful for patterns ending in this layout.
pub const M2_PATTERN: &str =
    "[organisation]/[module]/[revision]/[artifact]-[revision](-[classifier]).[ext]";

lazy_static! {
    static ref OPTIONAL_GROUP: Regex = Regex::new(r"\(([^()]*)\)").unwrap();
    static ref TOKEN: Regex = Regex::new(r"\[([a-z]+)\]").unwrap();
}

/// A whole location pattern (root and layout concatenated), rendered against a
///  module coordinate and an artifact descriptor to yield one concrete path.
///
/// Tokens in `[...]` are substituted from the coordinate and artifact; parts in
///  `(...)` are dropped entirely when a token inside has no value. The `[revision]`
///  occurrence in the final path segment is the timestamped version when resolving
///  against a unique-snapshot source; directory occurrences keep the base version,
///  matching the layout of unique snapshots in a Maven repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePattern {
    pattern: String,
}

impl ResourcePattern {
    pub fn new(pattern: impl Into<String>) -> ResourcePattern {
        ResourcePattern {
            pattern: pattern.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn to_path(
        &self,
        coordinate: &ModuleCoordinate,
        artifact: &ArtifactDescriptor,
        source: &ModuleSource,
    ) -> String {
        match self.pattern.rsplit_once('/') {
            Some((dir_part, file_part)) => {
                let dir = render(dir_part, coordinate, &coordinate.version, Some(artifact));
                let file = render(
                    file_part,
                    coordinate,
                    &file_revision(coordinate, source),
                    Some(artifact),
                );
                format!("{}/{}", dir, file)
            }
            None => render(
                &self.pattern,
                coordinate,
                &file_revision(coordinate, source),
                Some(artifact),
            ),
        }
    }

    /// The rendered directory holding all files of one module version. Artifact
    ///  tokens must not occur outside the pattern's final segment.
    pub fn to_module_version_path(&self, coordinate: &ModuleCoordinate) -> String {
        let dir_part = match self.pattern.rsplit_once('/') {
            Some((dir_part, _)) => dir_part,
            None => "",
        };
        render(dir_part, coordinate, &coordinate.version, None)
    }
}

fn file_revision(coordinate: &ModuleCoordinate, source: &ModuleSource) -> String {
    match source {
        ModuleSource::UniqueSnapshot(identity) if coordinate.version.ends_with("SNAPSHOT") => {
            let base = &coordinate.version[..coordinate.version.len() - "SNAPSHOT".len()];
            format!("{}{}", base, identity)
        }
        _ => coordinate.version.clone(),
    }
}

fn render(
    part: &str,
    coordinate: &ModuleCoordinate,
    revision: &str,
    artifact: Option<&ArtifactDescriptor>,
) -> String {
    let with_groups = OPTIONAL_GROUP.replace_all(part, |caps: &Captures| {
        match substitute(&caps[1], coordinate, revision, artifact) {
            Some(rendered) => rendered,
            None => String::new(),
        }
    });

    TOKEN
        .replace_all(&with_groups, |caps: &Captures| {
            token_value(&caps[1], coordinate, revision, artifact).unwrap_or_default()
        })
        .into_owned()
}

/// Renders an optional part, `None` if any token inside has no value.
fn substitute(
    text: &str,
    coordinate: &ModuleCoordinate,
    revision: &str,
    artifact: Option<&ArtifactDescriptor>,
) -> Option<String> {
    let mut missing = false;
    let rendered = TOKEN.replace_all(text, |caps: &Captures| {
        match token_value(&caps[1], coordinate, revision, artifact) {
            Some(value) => value,
            None => {
                missing = true;
                String::new()
            }
        }
    });

    if missing {
        None
    } else {
        Some(rendered.into_owned())
    }
}

fn token_value(
    token: &str,
    coordinate: &ModuleCoordinate,
    revision: &str,
    artifact: Option<&ArtifactDescriptor>,
) -> Option<String> {
    match token {
        // m2 layout: dots in the group become directory levels
        "organisation" | "organization" => Some(coordinate.group.replace('.', "/")),
        "module" => Some(coordinate.name.clone()),
        "revision" => Some(revision.to_string()),
        "artifact" => artifact.map(|a| a.name.clone()),
        "ext" => artifact.map(|a| a.extension.clone()),
        "classifier" => artifact.and_then(|a| a.classifier.clone()),
        _ => None,
    }
}
