use std::env;
use std::fs::{read_to_string, File};
use std::io::prelude::*;
use std::path::PathBuf;

fn compile_into_spirv(out_dir: &PathBuf, filename: &str, ty: glsl_to_spirv::ShaderType) {
    let path = format!("src/data/{}", filename);
    println!("cargo:rerun-if-changed={}", path);

    let code = read_to_string(&path).unwrap();
    let mut compiled = glsl_to_spirv::compile(&code, ty).unwrap_or_else(|err| {
        eprintln!("compile {}:", path);
        panic!("{}", err)
    });
    let mut buf = vec![];
    compiled.read_to_end(&mut buf).unwrap();

    let out_path = out_dir.join(format!("{}.spv", filename));
    File::create(&out_path).unwrap().write_all(&buf).unwrap();
}

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    for (filename, ty) in vec![
        ("passthrough.vert", glsl_to_spirv::ShaderType::Vertex),
        ("triangle.frag", glsl_to_spirv::ShaderType::Fragment),
        ("heart.frag", glsl_to_spirv::ShaderType::Fragment),
    ]
    .into_iter()
    {
        compile_into_spirv(&out_dir, filename, ty);
    }
}
