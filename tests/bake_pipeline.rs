use std::path::{Path, PathBuf};

use glam::DVec3;
use mesh_baker::bake::{BlendPair, TextureChannel};
use mesh_baker::resource_system::file_formats::{animationfile, meshfile, staticmeshfile::StaticMesh};
use mesh_baker::{bake_scene, ExportError, ExportOptions, SceneDescription};

fn samples_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/samples")
}

fn load_arm() -> SceneDescription {
    SceneDescription::load(&samples_dir().join("arm.scene.json")).unwrap()
}

fn arm_json() -> serde_json::Value {
    let text = std::fs::read_to_string(samples_dir().join("arm.scene.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn arm_skeleton_and_buffers() {
    let baked = bake_scene(&load_arm()).unwrap();

    let joints: Vec<(&str, i32)> = baked
        .skeleton
        .joints
        .iter()
        .map(|j| (j.name.as_str(), j.parent_index))
        .collect();
    assert_eq!(joints, [("Shoulder", -1), ("Elbow", 0), ("Wrist", 1)]);

    assert_eq!(baked.vertices.len(), 6);
    let triangles: Vec<([u32; 3], Option<u32>)> =
        baked.triangles.iter().map(|t| (t.indices, t.material_index)).collect();
    assert_eq!(
        triangles,
        [
            ([0, 1, 2], Some(0)),
            ([0, 2, 3], Some(0)),
            ([1, 4, 5], Some(1)),
            ([1, 5, 2], Some(1)),
        ]
    );

    let forearm = &baked.vertices[4];
    assert_eq!(forearm.position, [2.0, 0.0, 0.0]);
    assert_eq!(
        forearm.blend_pairs,
        [
            BlendPair { joint: 1, weight: 0.7 },
            BlendPair { joint: 2, weight: 0.3 },
            BlendPair::EMPTY,
            BlendPair::EMPTY,
        ]
    );
    for vertex in &baked.vertices {
        assert!(vertex.blend_pairs.len() >= 4);
        let sum: f64 = vertex.blend_pairs.iter().map(|p| p.weight).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}

#[test]
fn arm_materials_share_textures() {
    let baked = bake_scene(&load_arm()).unwrap();

    assert_eq!(baked.textures.len(), 2);
    assert_eq!(baked.textures[0].path, "textures/skin.png");
    assert_eq!(baked.textures[1].channel, TextureChannel::Normal);
    assert_eq!(baked.materials[0].name, "skin");
    assert_eq!(baked.materials[0].texture_indices, [0, -1, -1, 1, -1]);
    assert_eq!(baked.materials[1].texture_indices, [0, -1, -1, -1, -1]);
}

#[test]
fn arm_keyframes_follow_the_take() {
    let baked = bake_scene(&load_arm()).unwrap();
    let animation = baked.animation.as_ref().unwrap();
    assert_eq!(animation.name, "Wave");
    assert_eq!(animation.length, 13);

    for joint in &baked.skeleton.joints {
        let frames: Vec<i64> = joint.keyframes.iter().map(|k| k.frame).collect();
        assert_eq!(frames, (0..=12).collect::<Vec<_>>());
    }

    let wrist = &baked.skeleton.joints[2];
    let rest = wrist.keyframes[0].global_transform.w_axis.truncate();
    assert!(rest.abs_diff_eq(DVec3::new(2.0, 0.0, 0.0), 1e-6));
    // elbow bends 45 degrees about z by the end of the take
    let bent = wrist.keyframes[12].global_transform.w_axis.truncate();
    let half_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
    assert!(bent.abs_diff_eq(DVec3::new(1.0 + half_sqrt2, half_sqrt2, 0.0), 1e-6));

    let elbow_bind = baked.skeleton.joints[1].bind_pose_inverse.w_axis.truncate();
    assert!(elbow_bind.abs_diff_eq(DVec3::new(-1.0, 0.0, 0.0), 1e-12));
}

#[test]
fn arm_text_assets() {
    let baked = bake_scene(&load_arm()).unwrap();

    let mut mesh = vec![];
    meshfile::write_mesh(&baked, &mut mesh).unwrap();
    let mesh = String::from_utf8(mesh).unwrap();
    assert!(mesh.contains("\t<format>pnst</format>\n"));
    assert!(mesh.contains("\t<texture>textures/skin.png</texture>\n\t<texture>textures/skin.png</texture>\n"));
    assert!(mesh.contains("\t\t<tri>1,5,4</tri>\n"));
    assert!(mesh.contains("<sw>0.7,0.3,0,0</sw>\n\t\t\t<si>1,2,0,0</si>\n\t\t\t<tex>1,1</tex>"));

    let mut anim = vec![];
    animationfile::write_animation(&baked, &mut anim).unwrap();
    let anim = String::from_utf8(anim).unwrap();
    assert!(anim.contains("\t<skeleton count='3'>\n"));
    assert!(anim.contains("<joint id='2' name='Wrist' parent='1'>"));
    assert!(anim.contains("\t\t<animation name='Wave' length='13'>\n"));
    assert_eq!(anim.matches("<frame num=").count(), 39);
    assert!(anim.contains("<frame num='11'>"));
    assert!(!anim.contains("<frame num='12'>"));
}

#[test]
fn arm_binary_asset_round_trips_through_disk() {
    let baked = bake_scene(&load_arm()).unwrap();
    let options = ExportOptions {
        texture_root: Some(samples_dir()),
    };
    let mesh = StaticMesh::from_baked(&baked, &options).unwrap();

    let out_dir = std::env::temp_dir().join(format!("mesh-baker-arm-{}", std::process::id()));
    std::fs::create_dir_all(&out_dir).unwrap();
    let path = out_dir.join("arm.static_mesh");
    mesh.write_to(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let skin_png = std::fs::read(samples_dir().join("textures/skin.png")).unwrap();
    let normal_png = std::fs::read(samples_dir().join("textures/skin_normal.png")).unwrap();
    assert_eq!(
        bytes.len(),
        20 + 6 * 32 + 4 * 16 + 2 * 96 + 4 + skin_png.len() + 4 + normal_png.len()
    );
    assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
    assert_eq!(&bytes[4..8], &6u32.to_le_bytes());

    let loaded = StaticMesh::load(&path).unwrap();
    assert_eq!(loaded, mesh);
    assert_eq!(loaded.textures, [skin_png, normal_png]);
    assert_eq!(loaded.triangles[2].material_index, 1);
    std::fs::remove_dir_all(out_dir).unwrap();
}

#[test]
fn cluster_linked_to_unknown_joint_aborts_the_export() {
    let mut json = arm_json();
    // demote the wrist so its cluster no longer has a joint
    json["root"]["children"][0]["children"][0]["children"][0]["children"][0]["attribute"] =
        serde_json::Value::from("none");
    let scene = SceneDescription::from_json(&json.to_string()).unwrap();

    match bake_scene(&scene) {
        Err(ExportError::SkeletonIntegrity { joint }) => assert_eq!(joint, "Wrist"),
        other => panic!("expected SkeletonIntegrity, got {:?}", other.map(|b| b.vertices.len())),
    }
}

#[test]
fn layered_texture_aborts_the_export() {
    let mut json = arm_json();
    json["root"]["children"][1]["materials"][1]["textures"][0]["source"] =
        serde_json::json!({ "kind": "layered", "layers": ["a.png", "b.png"] });
    let scene = SceneDescription::from_json(&json.to_string()).unwrap();
    assert!(matches!(
        bake_scene(&scene),
        Err(ExportError::UnsupportedTextureLayering { material, .. }) if material == "sleeve"
    ));
}

#[test]
fn missing_uv_layer_aborts_the_export() {
    let mut json = arm_json();
    json["root"]["children"][1]["mesh"]["uvs"] = serde_json::json!([]);
    let scene = SceneDescription::from_json(&json.to_string()).unwrap();
    assert!(matches!(
        bake_scene(&scene),
        Err(ExportError::InvalidUvLayer { layer: 0, available: 0 })
    ));
}
