use docchat_core::ChatService;

use crate::config::DocchatConfig;

pub fn build_service(config: &DocchatConfig) -> ChatService {
    ChatService::from_config(config.docs.clone(), config.provider.clone())
}
