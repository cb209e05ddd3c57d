//! Aspect, advice, and system definitions.
//!
//! A system definition bundles aspects, each aspect bundles named pointcuts
//! and advice in declaration order, and every advice binds a compiled
//! pointcut expression to an advice method signature, a temporal kind, and a
//! deployment-model tag. The deployment model is opaque here; the container
//! layer consumes it to pick an instance-pooling strategy.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{
    unspanned, DefinitionContext, ErrorKind, ErrorReporting, SourceContext, WeftError,
};
use crate::expr::{ExpressionInfo, ExpressionNamespace};

pub mod document;

pub use document::{DefinitionDocument, DefinitionReport};

// ============================================================================
// TAGS
// ============================================================================

/// Temporal kind of an advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdviceKind {
    Before,
    Around,
    AfterReturning,
    AfterThrowing,
    AfterFinally,
}

impl std::fmt::Display for AdviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AdviceKind::Before => "before",
            AdviceKind::Around => "around",
            AdviceKind::AfterReturning => "after-returning",
            AdviceKind::AfterThrowing => "after-throwing",
            AdviceKind::AfterFinally => "after-finally",
        };
        write!(f, "{}", name)
    }
}

/// Instance-scoping policy for an aspect's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentModel {
    #[default]
    PerJvm,
    PerClass,
    PerInstance,
    PerThread,
}

// ============================================================================
// ADVICE SIGNATURES
// ============================================================================

/// One advice-method parameter: declared type name and parameter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceParam {
    pub type_name: String,
    pub name: String,
}

/// Parsed advice method signature: `name(type name, type name, ...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceSignature {
    source: String,
    pub name: String,
    pub params: Vec<AdviceParam>,
}

impl AdviceSignature {
    pub fn parse(text: &str) -> Result<Self, WeftError> {
        let ctx = DefinitionContext::new(SourceContext::from_text("signature", text), "signature");
        let malformed = |reason: &str| {
            ctx.report(
                ErrorKind::MalformedSignature {
                    signature: text.to_string(),
                    reason: reason.to_string(),
                },
                unspanned(),
            )
        };

        let trimmed = text.trim();
        let Some(open) = trimmed.find('(') else {
            return Err(malformed("missing '('"));
        };
        if !trimmed.ends_with(')') {
            return Err(malformed("missing ')'"));
        }
        let name = trimmed[..open].trim();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(malformed("missing advice name"));
        }

        let params_text = trimmed[open + 1..trimmed.len() - 1].trim();
        let mut params = vec![];
        if !params_text.is_empty() {
            for entry in params_text.split(',') {
                let mut tokens = entry.split_whitespace();
                let (Some(type_name), Some(param_name), None) =
                    (tokens.next(), tokens.next(), tokens.next())
                else {
                    return Err(malformed("each parameter must be 'type name'"));
                };
                params.push(AdviceParam {
                    type_name: type_name.to_string(),
                    name: param_name.to_string(),
                });
            }
        }

        Ok(Self {
            source: trimmed.to_string(),
            name: name.to_string(),
            params,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parameter name → declared type table, installed on the expression so
    /// `this`/`target`/`args` tokens can resolve to advice parameters.
    pub fn arg_types(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|p| (p.name.clone(), p.type_name.clone()))
            .collect()
    }
}

/// The bound name and type of an after-returning / after-throwing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialArg {
    pub name: String,
    pub type_name: String,
}

// ============================================================================
// DEFINITIONS
// ============================================================================

/// One advice: compiled expression plus method metadata.
#[derive(Debug, Clone)]
pub struct AdviceDefinition {
    pub name: String,
    pub aspect: String,
    pub kind: AdviceKind,
    pub deployment_model: DeploymentModel,
    pub expression: Arc<ExpressionInfo>,
    pub signature: AdviceSignature,
    pub special_arg: Option<SpecialArg>,
}

impl AdviceDefinition {
    /// Compiles the advice's expression and signature. The signature's
    /// parameter types are installed on the expression so bound names
    /// resolve during evaluation.
    #[allow(clippy::too_many_arguments)]
    pub fn compile(
        aspect: &str,
        name: &str,
        kind: AdviceKind,
        deployment_model: DeploymentModel,
        expression_text: &str,
        signature_text: &str,
        special_arg: Option<SpecialArg>,
        namespace: &ExpressionNamespace,
    ) -> Result<Self, WeftError> {
        let signature = AdviceSignature::parse(signature_text)?;
        let expression = ExpressionInfo::compile(expression_text, namespace.name())?
            .with_arg_types(signature.arg_types());
        Ok(Self {
            name: name.to_string(),
            aspect: aspect.to_string(),
            kind,
            deployment_model,
            expression: Arc::new(expression),
            signature,
            special_arg,
        })
    }
}

/// A named bundle of pointcuts and advice plus a deployment model.
#[derive(Debug, Clone)]
pub struct AspectDefinition {
    pub name: String,
    pub class_name: String,
    pub deployment_model: DeploymentModel,
    /// Advice in declaration order; resolution preserves this order.
    pub advice: Vec<AdviceDefinition>,
}

impl AspectDefinition {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            deployment_model: DeploymentModel::default(),
            advice: vec![],
        }
    }

    pub fn with_deployment_model(mut self, deployment_model: DeploymentModel) -> Self {
        self.deployment_model = deployment_model;
        self
    }

    pub fn add_advice(&mut self, advice: AdviceDefinition) {
        self.advice.push(advice);
    }
}

/// A weave system: aspects in registration order plus the expression
/// namespace they share.
#[derive(Debug)]
pub struct SystemDefinition {
    pub id: String,
    /// Aspects in registration order; no cross-aspect priority exists.
    pub aspects: Vec<AspectDefinition>,
    pub namespace: ExpressionNamespace,
}

impl SystemDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let namespace = ExpressionNamespace::new(id.clone());
        Self {
            id,
            aspects: vec![],
            namespace,
        }
    }

    pub fn add_aspect(&mut self, aspect: AspectDefinition) {
        self.aspects.push(aspect);
    }

    pub fn aspect(&self, name: &str) -> Option<&AspectDefinition> {
        self.aspects.iter().find(|a| a.name == name)
    }
}
