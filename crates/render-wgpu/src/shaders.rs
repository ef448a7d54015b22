/// WGSL program for the height-displaced block field.
///
/// Vertex stage: sample the height texture at the instance UV, lift the
/// instance matrix's translation by `height * vertical_scale`, then apply the
/// view-projection. Fragment stage: blend the low/high tint by height and
/// light it with a hemisphere light.
pub const BLOCK_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    low_color: vec4<f32>,
    high_color: vec4<f32>,
    sky_color: vec4<f32>,
    ground_color: vec4<f32>,
    // x: vertical scale, y: light intensity
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var height_map: texture_2d<f32>;
@group(1) @binding(1)
var height_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) inst_uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) height: f32,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let h = textureSampleLevel(height_map, height_sampler, instance.inst_uv, 0.0).r;

    var model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    model[3].y += h * uniforms.params.x;

    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.height = h;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = mix(uniforms.low_color.rgb, uniforms.high_color.rgb, in.height);
    let n = normalize(in.world_normal);
    let w = 0.5 * n.y + 0.5;
    let irradiance = mix(uniforms.ground_color.rgb, uniforms.sky_color.rgb, w) * uniforms.params.y;
    return vec4<f32>(base * irradiance, 1.0);
}
"#;
