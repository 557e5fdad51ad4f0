use crate::config::LlmSettings;
use crate::error::PlannerError;
use crate::metrics::{inc_lookup_error, inc_lookup_success};
use crate::prompt::PREAMBLE;
use rig::agent::Agent;
use rig::completion::Prompt;
use rig::providers::openai;
use rig::providers::openai::completion::CompletionModel;
use tracing::{info, instrument};

/// Turns the trip prompt into prose through an OpenAI chat model
pub struct ItineraryWriter {
    agent: Agent<CompletionModel>,
    model: String,
}

impl ItineraryWriter {
    pub fn new(settings: &LlmSettings) -> Result<Self, PlannerError> {
        let api_key = settings
            .api_key
            .as_deref()
            .ok_or(PlannerError::MissingApiKey("OPENAI_API_KEY"))?;
        let agent = openai::Client::new(api_key)
            .agent(&settings.model)
            .preamble(PREAMBLE)
            .temperature(settings.temperature)
            .max_tokens(settings.max_tokens)
            .build();
        Ok(Self {
            agent,
            model: settings.model.clone(),
        })
    }

    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    pub async fn write(&self, prompt: &str) -> Result<String, PlannerError> {
        info!("Requesting itinerary completion");
        match self.agent.prompt(prompt).await {
            Ok(itinerary) => {
                inc_lookup_success("completion");
                info!(itinerary_len = itinerary.len(), "Received itinerary");
                Ok(itinerary)
            }
            Err(e) => {
                let error = PlannerError::Completion(e.to_string());
                inc_lookup_error("completion", 0, &error);
                Err(error)
            }
        }
    }
}
