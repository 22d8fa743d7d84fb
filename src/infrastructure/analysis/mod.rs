mod http_vision_gateway;
mod mock_gateway;

pub use http_vision_gateway::HttpVisionGateway;
pub use mock_gateway::MockAnalysisGateway;
