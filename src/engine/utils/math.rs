pub type Mat4x4 = [f32; 16];
pub type Vec3 = [f32; 3];
pub type Quat = [f32; 4]; // xyzw

pub fn mat4x4_identity() -> Mat4x4 {
    [
      1.0, 0.0, 0.0, 0.0,
      0.0, 1.0, 0.0, 0.0,
      0.0, 0.0, 1.0, 0.0,
      0.0, 0.0, 0.0, 1.0
    ]
}

pub fn mat4x4_translate(x: f32, y: f32, z: f32) -> Mat4x4 {
    [
      1.0, 0.0, 0.0,  x,
      0.0, 1.0, 0.0,  y,
      0.0, 0.0, 1.0,  z,
      0.0, 0.0, 0.0, 1.0
    ]
}

pub fn mat4x4_scale(x: f32, y: f32, z: f32) -> Mat4x4 {
    [
       x,  0.0, 0.0, 0.0,
      0.0,  y,  0.0, 0.0,
      0.0, 0.0,  z,  0.0,
      0.0, 0.0, 0.0, 1.0
    ]
}

pub fn mat4x4_from_quat(quat: Quat) -> Mat4x4 {
    let [x, y, z, w] = quat;
    let x2 = x * x;
    let y2 = y * y;
    let z2 = z * z;
    let w2 = w * w;

    let xy = 2.0 * x * y;
    let xz = 2.0 * x * z;
    let xw = 2.0 * x * w;
    let yz = 2.0 * y * z;
    let yw = 2.0 * y * w;
    let zw = 2.0 * z * w;

    [
        w2 + x2 - y2 - z2,  xy - zw,            xz + yw,            0.0,
        xy + zw,            w2 - x2 + y2 - z2,  yz - xw,            0.0,
        xz - yw,            yz + xw,            w2 - x2 - y2 + z2,  0.0,
        0.0,                0.0,                0.0,                1.0,
    ]
}

pub fn mat4x4_transpose(matrix: Mat4x4) -> Mat4x4 {
    let mut ret = [0.0; 16];
    for i in 0..16 {
        let row = i / 4;
        let col = i % 4;
        ret[col * 4 + row] = matrix[row * 4 + col];
    }
    ret
}

pub fn vec4_dot(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

pub fn mat4x4_row(mat: &Mat4x4, row: usize) -> [f32; 4] {
    let start_idx = row * 4;
    [mat[start_idx], mat[start_idx + 1], mat[start_idx + 2], mat[start_idx + 3]]
}

pub fn mat4x4_col(mat: &Mat4x4, col: usize) -> [f32; 4] {
    [mat[col], mat[4 + col], mat[8 + col], mat[12 + col]]
}

pub fn mat4x4_mul(a: Mat4x4, b: Mat4x4) -> Mat4x4 {
    let mut ret = [0.0; 16];
    for i in 0..16 {
        let row = i / 4;
        let col = i % 4;
        let a_row = mat4x4_row(&a, row);
        let b_col = mat4x4_col(&b, col);
        ret[i] = vec4_dot(a_row, b_col);
    }
    ret
}

pub fn mat4x4_perspective(fov_y_radians: f32, aspect_ratio: f32, near: f32, far: f32) -> Mat4x4 {
    let f = 1.0 / (fov_y_radians * 0.5).tan();
    let range_inv = 1.0 / (near - far);

    [
        f / aspect_ratio, 0.0, 0.0,                          0.0,
        0.0,              f,   0.0,                          0.0,
        0.0,              0.0, (near + far) * range_inv,     (2.0 * near * far) * range_inv,
        0.0,              0.0, -1.0,                         0.0,
    ]
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

// Hermite ease used to warp cross-fade weight ramps.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

// Build view matrix from position and Euler angles
pub fn build_view_matrix(pos: Vec3, pitch: f32, yaw: f32) -> Mat4x4 {
    let (right, up, forward) = camera_basis(pitch, yaw);

    let tx = -(right[0] * pos[0] + right[1] * pos[1] + right[2] * pos[2]);
    let ty = -(up[0] * pos[0] + up[1] * pos[1] + up[2] * pos[2]);
    let tz = -(forward[0] * pos[0] + forward[1] * pos[1] + forward[2] * pos[2]);

    [
        right[0],   right[1],   right[2],   tx,
        up[0],      up[1],      up[2],      ty,
        forward[0], forward[1], forward[2], tz,
        0.0,        0.0,        0.0,        1.0,
    ]
}

// Camera basis vectors matching build_view_matrix. The camera looks along
// the negative `forward` axis.
pub fn camera_basis(pitch: f32, yaw: f32) -> (Vec3, Vec3, Vec3) {
    let cp = pitch.cos();
    let sp = pitch.sin();
    let cy = yaw.cos();
    let sy = yaw.sin();

    let forward = [-sy * cp, sp, cy * cp];
    let right = [cy, 0.0, sy];
    let up = [sy * sp, cp, -cy * sp];

    (right, up, forward)
}

pub fn vec3_add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn vec3_scale(v: Vec3, s: f32) -> Vec3 {
    [v[0] * s, v[1] * s, v[2] * s]
}

pub fn vec3_normalize(v: Vec3) -> Vec3 {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len <= f32::EPSILON {
        return [0.0, 0.0, 0.0];
    }
    vec3_scale(v, 1.0 / len)
}

pub fn quat_mul(a: Quat, b: Quat) -> Quat {
    let [ax, ay, az, aw] = a;
    let [bx, by, bz, bw] = b;
    [
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    ]
}

pub fn quat_dot(a: Quat, b: Quat) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

pub fn quat_normalize(q: Quat) -> Quat {
    let len = quat_dot(q, q).sqrt();
    if len <= f32::EPSILON {
        return [0.0, 0.0, 0.0, 1.0];
    }
    [q[0] / len, q[1] / len, q[2] / len, q[3] / len]
}

// Local joint rotation from pointer-derived angles: pitch about X first,
// then yaw about Y.
pub fn quat_from_pitch_yaw(pitch: f32, yaw: f32) -> Quat {
    let half_p = pitch * 0.5;
    let half_y = yaw * 0.5;
    let qx = [half_p.sin(), 0.0, 0.0, half_p.cos()];
    let qy = [0.0, half_y.sin(), 0.0, half_y.cos()];
    quat_mul(qy, qx)
}
