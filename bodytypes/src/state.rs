use derive_more::Display;

/// Position [m] and velocity [m/s], expressed in the global frame
pub type CartesianState = na::Vector6<f64>;

/// Attitude of a body: rotation to the base frame plus body-frame angular rate
#[derive(Copy, Clone, PartialEq, Debug, Display)]
#[display(fmt = "{{q: {}, w: {}}}", "rotation_to_base", "angular_velocity")]
pub struct RotationalState {
    /// Rotation from the body-fixed frame to the base frame
    pub rotation_to_base: na::UnitQuaternion<f64>,

    /// Angular velocity of the body wrt the base frame, expressed in the body frame [rad/s]
    pub angular_velocity: na::Vector3<f64>,
}

impl Default for RotationalState {
    fn default() -> Self {
        Self {
            rotation_to_base: na::UnitQuaternion::identity(),
            angular_velocity: na::Vector3::zeros(),
        }
    }
}

impl RotationalState {
    pub fn new(rotation_to_base: na::UnitQuaternion<f64>, angular_velocity: na::Vector3<f64>) -> Self {
        Self {
            rotation_to_base,
            angular_velocity,
        }
    }

    /// Packed as [qw, qx, qy, qz, wx, wy, wz]
    pub fn from_slice(v: &[f64]) -> Self {
        let q = na::Quaternion::new(v[0], v[1], v[2], v[3]);
        Self {
            rotation_to_base: na::UnitQuaternion::from_quaternion(q),
            angular_velocity: na::Vector3::new(v[4], v[5], v[6]),
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        let q = self.rotation_to_base.quaternion();
        vec![
            q.w,
            q.i,
            q.j,
            q.k,
            self.angular_velocity.x,
            self.angular_velocity.y,
            self.angular_velocity.z,
        ]
    }

    /// Rotation from the base frame to the body-fixed frame
    pub fn rotation_to_body(&self) -> na::UnitQuaternion<f64> {
        self.rotation_to_base.inverse()
    }
}
