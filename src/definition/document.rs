//! Definition documents: the textual carrier of a weave system.
//!
//! A document names a system, its aspects, their named pointcuts, and their
//! advice, and loads from YAML or JSON. Loading compiles every expression and
//! signature up front; a bad aspect is dropped with its error recorded while
//! the remaining aspects and the shared namespace stay intact, so one broken
//! definition never blocks unrelated aspects from weaving.

use serde::{Deserialize, Serialize};

use crate::definition::{
    AdviceDefinition, AdviceKind, AspectDefinition, DeploymentModel, SpecialArg, SystemDefinition,
};
use crate::errors::{
    unspanned, DefinitionContext, ErrorKind, ErrorReporting, SourceContext, WeftError,
};
use crate::expr::ExpressionInfo;

// ============================================================================
// DOCUMENT MODEL
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DefinitionDocument {
    pub system: String,
    #[serde(default)]
    pub aspects: Vec<AspectDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AspectDoc {
    pub name: String,
    pub class: String,
    #[serde(default)]
    pub deployment_model: DeploymentModel,
    #[serde(default)]
    pub pointcuts: Vec<PointcutDoc>,
    #[serde(default)]
    pub advice: Vec<AdviceDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PointcutDoc {
    pub name: String,
    pub expression: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdviceDoc {
    pub name: String,
    pub kind: AdviceKind,
    /// The pointcut expression this advice binds to.
    pub bind_to: String,
    pub signature: String,
    #[serde(default)]
    pub special_arg: Option<SpecialArgDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SpecialArgDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Result of compiling a document: the system with every aspect that
/// compiled, plus the errors of the aspects that did not.
#[derive(Debug)]
pub struct DefinitionReport {
    pub system: SystemDefinition,
    pub errors: Vec<WeftError>,
}

impl DefinitionReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

// ============================================================================
// LOADING
// ============================================================================

impl DefinitionDocument {
    pub fn from_yaml_str(text: &str) -> Result<Self, WeftError> {
        serde_yaml::from_str(text).map_err(|e| document_error(text, &e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self, WeftError> {
        serde_json::from_str(text).map_err(|e| document_error(text, &e.to_string()))
    }

    /// Compiles the document into a system definition.
    ///
    /// Aspects compile independently: a failure records the error and skips
    /// that aspect without registering any of its pointcuts.
    pub fn compile(&self) -> DefinitionReport {
        let mut system = SystemDefinition::new(self.system.clone());
        let mut errors = vec![];

        for aspect_doc in &self.aspects {
            if system.aspect(&aspect_doc.name).is_some() {
                errors.push(duplicate_aspect_error(&self.system, &aspect_doc.name));
                continue;
            }
            match compile_aspect(aspect_doc, &system) {
                Ok((aspect, pointcuts)) => {
                    for (name, expression) in pointcuts {
                        system.namespace.register(name, expression);
                    }
                    system.add_aspect(aspect);
                }
                Err(error) => errors.push(error),
            }
        }

        DefinitionReport { system, errors }
    }
}

type CompiledPointcuts = Vec<(String, std::sync::Arc<ExpressionInfo>)>;

/// Compiles one aspect completely before anything is registered, so a failed
/// aspect leaves no trace in the shared namespace.
fn compile_aspect(
    doc: &AspectDoc,
    system: &SystemDefinition,
) -> Result<(AspectDefinition, CompiledPointcuts), WeftError> {
    let mut pointcuts: CompiledPointcuts = vec![];
    for pointcut in &doc.pointcuts {
        if pointcuts.iter().any(|(name, _)| name == &pointcut.name) {
            return Err(duplicate_pointcut_error(&doc.name, &pointcut.name));
        }
        let compiled =
            ExpressionInfo::compile(&pointcut.expression, system.namespace.name())?;
        pointcuts.push((pointcut.name.clone(), std::sync::Arc::new(compiled)));
    }

    let mut aspect = AspectDefinition::new(doc.name.clone(), doc.class.clone())
        .with_deployment_model(doc.deployment_model);
    for advice_doc in &doc.advice {
        let special_arg = advice_doc.special_arg.as_ref().map(|s| SpecialArg {
            name: s.name.clone(),
            type_name: s.type_name.clone(),
        });
        let advice = AdviceDefinition::compile(
            &doc.name,
            &advice_doc.name,
            advice_doc.kind,
            doc.deployment_model,
            &advice_doc.bind_to,
            &advice_doc.signature,
            special_arg,
            &system.namespace,
        )?;
        aspect.add_advice(advice);
    }

    Ok((aspect, pointcuts))
}

fn document_error(text: &str, detail: &str) -> WeftError {
    let ctx = DefinitionContext::new(SourceContext::from_text("definition", text), "document");
    ctx.report(
        ErrorKind::InvalidDocument {
            detail: detail.to_string(),
        },
        unspanned(),
    )
}

fn duplicate_aspect_error(system: &str, aspect: &str) -> WeftError {
    let ctx = DefinitionContext::new(SourceContext::from_text(system, aspect), "document");
    ctx.report(
        ErrorKind::DuplicateAspect {
            aspect: aspect.to_string(),
        },
        unspanned(),
    )
}

fn duplicate_pointcut_error(aspect: &str, pointcut: &str) -> WeftError {
    let ctx = DefinitionContext::new(SourceContext::from_text(aspect, pointcut), "document");
    ctx.report(
        ErrorKind::DuplicatePointcut {
            pointcut: pointcut.to_string(),
            aspect: aspect.to_string(),
        },
        unspanned(),
    )
}
