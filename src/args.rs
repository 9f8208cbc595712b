use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Camera Index (default 0)
    #[arg(short, long, default_value_t = 0)]
    pub cam_index: u32,

    /// Hand landmark model path
    #[arg(long, default_value = "models/hand_landmarks.onnx")]
    pub model: String,

    /// Use the scripted hand instead of a camera
    #[arg(long)]
    pub simulate: bool,

    /// Disable the default horizontal mirror of the camera output
    #[arg(long)]
    pub no_mirror: bool,

    /// List available cameras
    #[arg(long)]
    pub list: bool,
}
