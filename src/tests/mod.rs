//! Cross-module test suite for the compatibility layer
//!
//! Module-local behavior is tested next to each module; the suites here
//! cover the serializer's hook contract, property-based invariants, and the
//! registry and serializer working together.
