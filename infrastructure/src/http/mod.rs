//! HTTP adapter for the MedBot server

mod gateway;

pub use gateway::ReqwestMedbotGateway;
