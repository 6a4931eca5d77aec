// SYNOID Clipper
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Finds short, high-engagement, non-overlapping windows in a long transcript.

pub mod clipper;
