//! Integration Tests Module
//!
//! End-to-end tests for imagegen: the backend API driven through the HTTP
//! store client, the OpenAI client against a local fake endpoint, and the
//! full generate/share/search workflow over real HTTP.

// Shared servers and config helpers
mod support;

// Backend routes through HttpImageStore
mod api_test;

// OpenAI client against a fake images endpoint
mod openai_test;

// Generation, sharing and search over the real backend
mod workflow_test;
