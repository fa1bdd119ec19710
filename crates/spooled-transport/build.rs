#[allow(clippy::unnecessary_wraps)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "rpc")]
    {
        println!("cargo:rerun-if-changed=proto/spooled.proto");
        println!("cargo:rerun-if-changed=proto");

        tonic_prost_build::configure()
            .build_client(true)
            .build_server(false)
            .compile_protos(&["proto/spooled.proto"], &["proto"])?;
    }

    Ok(())
}
