//! End-to-end sweep tests over scripted collaborators.

mod mocks;
