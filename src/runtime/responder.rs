use std::path::Path;
use std::sync::Arc;

use crate::agent::{AgentInfo, AgentReply, OfflineRouter, SupportAgent};
use crate::app::AppContext;
use crate::models::ProviderKind;
use crate::tools::ToolRegistry;
use crate::utils::SupportError;

/// Whatever answers questions in this session
pub enum Responder {
    /// Hosted model with tool calling
    Agent(Box<SupportAgent>),
    /// Keyword routing straight to the knowledge base
    Offline(OfflineRouter),
}

impl Responder {
    pub fn build(
        ctx: &AppContext,
        requested: Option<ProviderKind>,
        offline: bool,
    ) -> Result<Self, SupportError> {
        if offline {
            let tools = ToolRegistry::new(Arc::clone(&ctx.knowledge));
            return Ok(Responder::Offline(OfflineRouter::new(tools)));
        }
        Ok(Responder::Agent(Box::new(SupportAgent::new(ctx, requested)?)))
    }

    pub async fn respond(&mut self, question: &str) -> AgentReply {
        match self {
            Responder::Agent(agent) => agent.respond(question).await,
            Responder::Offline(router) => router.respond(question),
        }
    }

    /// Short name for banners and result metadata, e.g. `gemini/gemini-2.0-flash`
    pub fn label(&self) -> String {
        match self {
            Responder::Agent(agent) => {
                let info = agent.agent_info();
                format!("{}/{}", info.provider, info.model_id)
            }
            Responder::Offline(_) => "offline".to_string(),
        }
    }

    pub fn info(&self) -> Option<AgentInfo> {
        match self {
            Responder::Agent(agent) => Some(agent.agent_info()),
            Responder::Offline(_) => None,
        }
    }

    pub fn reset(&mut self) {
        if let Responder::Agent(agent) = self {
            agent.reset();
        }
    }

    /// Save the transcript; offline sessions keep none
    pub fn save_transcript(&self, path: &Path) -> Result<bool, SupportError> {
        match self {
            Responder::Agent(agent) => {
                agent.conversation().save(path)?;
                Ok(true)
            }
            Responder::Offline(_) => Ok(false),
        }
    }
}
