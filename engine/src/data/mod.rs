pub mod frame_builder;
